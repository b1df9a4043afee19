use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::calculate;
use crate::models::{CalculatedSearchTerm, SortDirection, TermSortKey};

#[derive(Debug, Deserialize)]
pub struct ListTermsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub campaign: Option<String>,
    pub ad_group: Option<String>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub min_clicks: Option<f64>,
    pub max_clicks: Option<f64>,
    pub min_conversions: Option<f64>,
    pub max_conversions: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TermListResponse {
    pub terms: Vec<CalculatedSearchTerm>,
    /// Row count before filtering
    pub total_records: u32,
    pub pagination: PaginationMeta,
}

/// Resolve sort key and direction from the query.
///
/// Text columns default to ascending, metrics to descending, matching the
/// dashboard's table behavior.
fn resolve_term_sort(
    sort: Option<&str>,
    direction: Option<&str>,
) -> Result<(TermSortKey, SortDirection), ApiError> {
    let key = match sort {
        Some(raw) => raw
            .parse::<TermSortKey>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => TermSortKey::Cost,
    };
    let direction = match direction {
        Some(raw) => raw
            .parse::<SortDirection>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None if key.is_text() => SortDirection::Asc,
        None => SortDirection::Desc,
    };
    Ok((key, direction))
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if let Some(min) = min {
        if !(value >= min) {
            return false;
        }
    }
    if let Some(max) = max {
        if !(value <= max) {
            return false;
        }
    }
    true
}

pub async fn list_terms(
    State(state): State<AppState>,
    Query(params): Query<ListTermsParams>,
) -> Result<Json<TermListResponse>, ApiError> {
    let (key, direction) = resolve_term_sort(params.sort.as_deref(), params.direction.as_deref())?;

    let data = state.data.read().await;
    let total_records = data.search_terms.len() as u32;
    let mut terms = calculate::calculate_all_terms(&data.search_terms);
    drop(data);

    terms.retain(|t| {
        if let Some(ref campaign) = params.campaign {
            if &t.record.campaign != campaign {
                return false;
            }
        }
        if let Some(ref ad_group) = params.ad_group {
            if &t.record.ad_group != ad_group {
                return false;
            }
        }
        within(t.record.cost, params.min_cost, params.max_cost)
            && within(t.record.clicks, params.min_clicks, params.max_clicks)
            && within(
                t.record.conversions,
                params.min_conversions,
                params.max_conversions,
            )
    });

    terms.sort_by(|a, b| direction.apply(key.compare(a, b)));

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, terms.len() as u32);
    let page = pagination.slice(&terms).to_vec();

    Ok(Json(TermListResponse {
        terms: page,
        total_records,
        pagination: meta,
    }))
}
