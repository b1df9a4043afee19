use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ingest;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub search_terms: u32,
    pub daily: u32,
    pub skipped_rows: u32,
    pub fetched_at: String,
}

/// Re-fetch both tabs and swap the in-memory dataset.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let outcome = ingest::load_dataset(state.source.as_ref())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let response = RefreshResponse {
        search_terms: outcome.data.search_terms.len() as u32,
        daily: outcome.data.daily.len() as u32,
        skipped_rows: outcome.skipped.len() as u32,
        fetched_at: outcome
            .data
            .fetched_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    };

    info!(
        terms = response.search_terms,
        daily = response.daily,
        skipped = response.skipped_rows,
        "dataset refreshed"
    );

    let mut data = state.data.write().await;
    *data = outcome.data;

    Ok(Json(response))
}
