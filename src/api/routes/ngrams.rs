use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::calculate::ngrams;
use crate::models::{NgramRecord, NgramSortKey, NgramWidth, SortDirection};

#[derive(Debug, Deserialize)]
pub struct NgramParams {
    pub width: Option<u8>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub min_clicks: Option<f64>,
    pub max_clicks: Option<f64>,
    pub min_conversions: Option<f64>,
    pub max_conversions: Option<f64>,
}

/// Totals over the filtered n-gram set, for the dashboard summary cards.
#[derive(Debug, Serialize)]
pub struct NgramSummary {
    pub total_ngrams: u32,
    pub total_cost: f64,
    pub total_clicks: f64,
    pub total_conversions: f64,
}

#[derive(Debug, Serialize)]
pub struct NgramResponse {
    pub width: u8,
    pub ngrams: Vec<NgramRecord>,
    pub summary: NgramSummary,
    pub pagination: PaginationMeta,
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

pub async fn ngram_analysis(
    State(state): State<AppState>,
    Query(params): Query<NgramParams>,
) -> Result<Json<NgramResponse>, ApiError> {
    let width = NgramWidth::new(params.width.unwrap_or(2))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let key = match params.sort.as_deref() {
        Some(raw) => raw
            .parse::<NgramSortKey>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => NgramSortKey::TotalCost,
    };
    let direction = match params.direction.as_deref() {
        Some(raw) => raw
            .parse::<SortDirection>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None if key == NgramSortKey::Ngram => SortDirection::Asc,
        None => SortDirection::Desc,
    };

    let data = state.data.read().await;
    let mut grams = ngrams::aggregate(&data.search_terms, width);
    drop(data);

    grams.retain(|g| {
        within(g.total_cost, params.min_cost, params.max_cost)
            && within(g.total_clicks, params.min_clicks, params.max_clicks)
            && within(
                g.total_conversions,
                params.min_conversions,
                params.max_conversions,
            )
    });

    let summary = NgramSummary {
        total_ngrams: grams.len() as u32,
        total_cost: grams.iter().map(|g| g.total_cost).sum(),
        total_clicks: grams.iter().map(|g| g.total_clicks).sum(),
        total_conversions: grams.iter().map(|g| g.total_conversions).sum(),
    };

    // Tie-break on the key string so paging is stable across calls.
    grams.sort_by(|a, b| {
        direction
            .apply(key.compare(a, b))
            .then_with(|| a.ngram.cmp(&b.ngram))
    });

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, grams.len() as u32);
    let page = pagination.slice(&grams).to_vec();

    Ok(Json(NgramResponse {
        width: width.as_usize() as u8,
        ngrams: page,
        summary,
        pagination: meta,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::api::state::AppState;
    use crate::api::build_router;
    use crate::fetch::StaticSource;
    use crate::models::{DataSet, SearchTermRecord};

    fn term(search_term: &str, cost: f64, clicks: f64) -> SearchTermRecord {
        SearchTermRecord {
            search_term: search_term.to_string(),
            campaign: "Brand".to_string(),
            ad_group: "Core".to_string(),
            impressions: 100.0,
            clicks,
            cost,
            conversions: 1.0,
            conversion_value: 20.0,
        }
    }

    fn state_with_terms(terms: Vec<SearchTermRecord>) -> AppState {
        let data = DataSet {
            search_terms: terms,
            daily: vec![],
            fetched_at: None,
        };
        AppState::new(
            data,
            Arc::new(StaticSource {
                daily: vec![],
                search_terms: vec![],
            }),
        )
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_ngram_analysis_bigrams() {
        let state = state_with_terms(vec![
            term("buy red shoes", 10.0, 5.0),
            term("buy blue shoes", 6.0, 3.0),
        ]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams?width=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["width"], 2);
        let grams = json["ngrams"].as_array().unwrap();
        assert_eq!(grams.len(), 4);
        // Default order: total cost descending; "buy red" and "red shoes"
        // share the top cost, tie-broken alphabetically.
        assert_eq!(grams[0]["ngram"], "buy red");
        assert_eq!(grams[0]["total_cost"], 10.0);
        assert_eq!(grams[1]["ngram"], "red shoes");
        assert_eq!(json["summary"]["total_ngrams"], 4);
        assert_eq!(json["summary"]["total_cost"], 32.0);
    }

    #[tokio::test]
    async fn test_ngram_analysis_default_width_is_two() {
        let state = state_with_terms(vec![term("buy red shoes", 10.0, 5.0)]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["width"], 2);
        assert_eq!(json["ngrams"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ngram_analysis_invalid_width_rejected() {
        let state = state_with_terms(vec![term("buy red shoes", 10.0, 5.0)]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams?width=4").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("width 4"));
    }

    #[tokio::test]
    async fn test_ngram_analysis_filters_apply_to_totals() {
        let state = state_with_terms(vec![
            term("buy red shoes", 10.0, 5.0),
            term("cheap socks", 1.0, 1.0),
        ]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams?width=1&min_cost=5").await;

        assert_eq!(status, StatusCode::OK);
        let grams = json["ngrams"].as_array().unwrap();
        // Only tokens of the expensive record survive the cost floor.
        assert_eq!(grams.len(), 3);
        for gram in grams {
            assert_eq!(gram["total_cost"], 10.0);
        }
        assert_eq!(json["summary"]["total_ngrams"], 3);
    }

    #[tokio::test]
    async fn test_ngram_analysis_empty_dataset() {
        let state = state_with_terms(vec![]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["ngrams"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["total_ngrams"], 0);
        assert_eq!(json["summary"]["total_cost"], 0.0);
    }

    #[tokio::test]
    async fn test_ngram_analysis_sort_by_count() {
        let state = state_with_terms(vec![
            term("red shoes", 1.0, 1.0),
            term("red boots", 2.0, 1.0),
            term("blue shoes", 3.0, 1.0),
        ]);

        let app = build_router(state, "*");
        let (status, json) = get_json(app, "/api/ngrams?width=1&sort=count").await;

        assert_eq!(status, StatusCode::OK);
        let grams = json["ngrams"].as_array().unwrap();
        // "red" and "shoes" both appear twice, alphabetical tie-break.
        assert_eq!(grams[0]["ngram"], "red");
        assert_eq!(grams[0]["count"], 2);
        assert_eq!(grams[1]["ngram"], "shoes");
    }
}
