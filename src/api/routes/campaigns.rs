use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{CampaignSummary, DailyRecord};

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignSummary>,
}

pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let data = state.data.read().await;
    let campaigns = calculate::campaign_summaries(&data.daily);

    Ok(Json(CampaignListResponse { campaigns }))
}

#[derive(Debug, Serialize)]
pub struct CampaignDailyResponse {
    pub campaign_id: String,
    pub records: Vec<DailyRecord>,
}

pub async fn campaign_daily(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CampaignDailyResponse>, ApiError> {
    let data = state.data.read().await;
    let records = calculate::metrics_by_date(&data.daily, &id);

    if records.is_empty() {
        return Err(ApiError::NotFound(format!("campaign {id}")));
    }

    Ok(Json(CampaignDailyResponse {
        campaign_id: id,
        records,
    }))
}
