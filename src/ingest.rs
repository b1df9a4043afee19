//! Row parsing and dataset loading.
//!
//! The upstream sheet serves loosely-typed JSON rows. Parsing into typed
//! records is fallible on purpose: a missing or malformed field produces a
//! [`RowError`] naming the row and field instead of being substituted with a
//! zero, so ingestion problems surface rather than masquerade as legitimate
//! data. The load pipeline skips bad rows, keeps the rest, and reports what
//! it skipped.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::fetch::{FetchError, Tab, TabSource};
use crate::models::{DailyRecord, DataSet, SearchTermRecord};

/// A row that could not be parsed into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("{tab} row {index}: not a JSON object")]
    NotAnObject { tab: &'static str, index: usize },

    #[error("{tab} row {index}: missing field `{field}`")]
    MissingField {
        tab: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{tab} row {index}: field `{field}` is not a {expected}")]
    WrongType {
        tab: &'static str,
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{tab} row {index}: invalid date `{value}`")]
    InvalidDate {
        tab: &'static str,
        index: usize,
        value: String,
    },
}

fn string_field(
    row: &Value,
    tab: &'static str,
    index: usize,
    field: &'static str,
) -> Result<String, RowError> {
    match row.get(field) {
        None | Some(Value::Null) => Err(RowError::MissingField { tab, index, field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RowError::WrongType {
            tab,
            index,
            field,
            expected: "string",
        }),
    }
}

/// Numeric fields arrive as JSON numbers or as numeric strings depending on
/// how the sheet formats the column; both are accepted, nothing else is.
fn number_field(
    row: &Value,
    tab: &'static str,
    index: usize,
    field: &'static str,
) -> Result<f64, RowError> {
    match row.get(field) {
        None | Some(Value::Null) => Err(RowError::MissingField { tab, index, field }),
        Some(Value::Number(n)) => n.as_f64().ok_or(RowError::WrongType {
            tab,
            index,
            field,
            expected: "number",
        }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| RowError::WrongType {
            tab,
            index,
            field,
            expected: "number",
        }),
        Some(_) => Err(RowError::WrongType {
            tab,
            index,
            field,
            expected: "number",
        }),
    }
}

/// Parse one search terms tab row.
pub fn parse_search_term_row(row: &Value, index: usize) -> Result<SearchTermRecord, RowError> {
    let tab = Tab::SearchTerms.as_str();
    if !row.is_object() {
        return Err(RowError::NotAnObject { tab, index });
    }

    Ok(SearchTermRecord {
        search_term: string_field(row, tab, index, "search_term")?,
        campaign: string_field(row, tab, index, "campaign")?,
        ad_group: string_field(row, tab, index, "ad_group")?,
        impressions: number_field(row, tab, index, "impr")?,
        clicks: number_field(row, tab, index, "clicks")?,
        cost: number_field(row, tab, index, "cost")?,
        conversions: number_field(row, tab, index, "conv")?,
        conversion_value: number_field(row, tab, index, "value")?,
    })
}

/// Parse one daily tab row.
pub fn parse_daily_row(row: &Value, index: usize) -> Result<DailyRecord, RowError> {
    let tab = Tab::Daily.as_str();
    if !row.is_object() {
        return Err(RowError::NotAnObject { tab, index });
    }

    let date_raw = string_field(row, tab, index, "date")?;
    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").map_err(|_| {
        RowError::InvalidDate {
            tab,
            index,
            value: date_raw,
        }
    })?;

    Ok(DailyRecord {
        campaign: string_field(row, tab, index, "campaign")?,
        campaign_id: string_field(row, tab, index, "campaignId")?,
        date,
        impressions: number_field(row, tab, index, "impr")?,
        clicks: number_field(row, tab, index, "clicks")?,
        cost: number_field(row, tab, index, "cost")?,
        conversions: number_field(row, tab, index, "conv")?,
        conversion_value: number_field(row, tab, index, "value")?,
    })
}

/// Result of loading both tabs into a fresh dataset.
#[derive(Debug)]
pub struct LoadOutcome {
    pub data: DataSet,
    pub skipped: Vec<RowError>,
}

fn parse_rows<T>(
    rows: &[Value],
    skipped: &mut Vec<RowError>,
    parse: impl Fn(&Value, usize) -> Result<T, RowError>,
) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match parse(row, index) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("skipping row: {err}");
                skipped.push(err);
                None
            }
        })
        .collect()
}

/// Fetch the search terms tab and parse it, reporting skipped rows.
pub async fn load_search_terms(
    source: &dyn TabSource,
) -> Result<(Vec<SearchTermRecord>, Vec<RowError>), FetchError> {
    let rows = source.fetch_tab(Tab::SearchTerms).await?;
    let mut skipped = Vec::new();
    let records = parse_rows(&rows, &mut skipped, parse_search_term_row);
    Ok((records, skipped))
}

/// Fetch the daily tab and parse it, reporting skipped rows.
pub async fn load_daily(
    source: &dyn TabSource,
) -> Result<(Vec<DailyRecord>, Vec<RowError>), FetchError> {
    let rows = source.fetch_tab(Tab::Daily).await?;
    let mut skipped = Vec::new();
    let records = parse_rows(&rows, &mut skipped, parse_daily_row);
    Ok((records, skipped))
}

/// Fetch and parse both tabs into a fresh dataset.
pub async fn load_dataset(source: &dyn TabSource) -> Result<LoadOutcome, FetchError> {
    let (search_terms, mut skipped) = load_search_terms(source).await?;
    let (daily, daily_skipped) = load_daily(source).await?;
    skipped.extend(daily_skipped);

    info!(
        source = source.name(),
        terms = search_terms.len(),
        daily = daily.len(),
        skipped = skipped.len(),
        "loaded dataset"
    );

    Ok(LoadOutcome {
        data: DataSet {
            search_terms,
            daily,
            fetched_at: Some(Utc::now()),
        },
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticSource;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn term_row() -> Value {
        json!({
            "search_term": "buy red shoes",
            "campaign": "Brand",
            "ad_group": "Shoes",
            "impr": 100,
            "clicks": 5,
            "cost": 10.5,
            "conv": 1,
            "value": 20
        })
    }

    #[test]
    fn test_parse_search_term_row() {
        let record = parse_search_term_row(&term_row(), 0).unwrap();

        assert_eq!(record.search_term, "buy red shoes");
        assert_eq!(record.impressions, 100.0);
        assert_eq!(record.cost, 10.5);
        assert_eq!(record.conversion_value, 20.0);
    }

    #[test]
    fn test_numeric_strings_parse() {
        let mut row = term_row();
        row["cost"] = json!("12.50");
        row["clicks"] = json!(" 7 ");

        let record = parse_search_term_row(&row, 0).unwrap();
        assert_eq!(record.cost, 12.5);
        assert_eq!(record.clicks, 7.0);
    }

    #[test]
    fn test_missing_field_is_an_error_not_a_zero() {
        let mut row = term_row();
        row.as_object_mut().unwrap().remove("cost");

        let err = parse_search_term_row(&row, 3).unwrap_err();
        assert_eq!(
            err,
            RowError::MissingField {
                tab: "searchTerms",
                index: 3,
                field: "cost"
            }
        );
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let mut row = term_row();
        row["clicks"] = json!("lots");

        let err = parse_search_term_row(&row, 1).unwrap_err();
        assert!(matches!(
            err,
            RowError::WrongType {
                field: "clicks",
                ..
            }
        ));
    }

    #[test]
    fn test_non_object_row_rejected() {
        let err = parse_search_term_row(&json!([1, 2, 3]), 9).unwrap_err();
        assert!(matches!(err, RowError::NotAnObject { index: 9, .. }));
    }

    fn daily_row() -> Value {
        json!({
            "campaign": "Brand",
            "campaignId": "c1",
            "date": "2025-07-01",
            "impr": 1000,
            "clicks": 50,
            "cost": 75.25,
            "conv": 4,
            "value": 320
        })
    }

    #[test]
    fn test_parse_daily_row() {
        let record = parse_daily_row(&daily_row(), 0).unwrap();

        assert_eq!(record.campaign_id, "c1");
        assert_eq!(record.date.to_string(), "2025-07-01");
        assert_eq!(record.conversions, 4.0);
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut row = daily_row();
        row["date"] = json!("01/07/2025");

        let err = parse_daily_row(&row, 2).unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidDate {
                tab: "daily",
                index: 2,
                value: "01/07/2025".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_load_dataset_skips_bad_rows() {
        let mut bad = term_row();
        bad.as_object_mut().unwrap().remove("search_term");

        let source = StaticSource {
            daily: vec![daily_row()],
            search_terms: vec![term_row(), bad],
        };

        let outcome = load_dataset(&source).await.unwrap();

        assert_eq!(outcome.data.search_terms.len(), 1);
        assert_eq!(outcome.data.daily.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.data.fetched_at.is_some());
    }
}
