//! Search term and daily performance rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single search term row as exported by the upstream sheet.
///
/// Numeric fields are whatever the sheet reported. Degenerate values
/// (negative, NaN) are not sanitized here; they flow through the derived
/// metrics arithmetically so that upstream data problems stay visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTermRecord {
    /// Raw free-text query. May contain mixed case and repeated whitespace.
    pub search_term: String,

    /// Campaign label
    pub campaign: String,

    /// Ad group label
    pub ad_group: String,

    pub impressions: f64,
    pub clicks: f64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

/// A search term row enriched with the standard derived ratios.
///
/// Produced 1:1 and in order from [`SearchTermRecord`]s, never mutated in
/// place. `roas` may be non-finite (zero cost with nonzero return);
/// consumers must render that as a placeholder, not treat it as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedSearchTerm {
    #[serde(flatten)]
    pub record: SearchTermRecord,

    /// Click-through rate (clicks / impressions)
    #[serde(rename = "CTR")]
    pub ctr: f64,

    /// Cost per click (cost / clicks)
    #[serde(rename = "CPC")]
    pub cpc: f64,

    /// Conversion rate (conversions / clicks)
    #[serde(rename = "CvR")]
    pub cvr: f64,

    /// Cost per acquisition (cost / conversions)
    #[serde(rename = "CPA")]
    pub cpa: f64,

    /// Return on ad spend (conversion value / cost)
    #[serde(rename = "ROAS")]
    pub roas: f64,
}

/// One campaign-day of performance from the daily tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub campaign: String,
    pub campaign_id: String,
    pub date: NaiveDate,
    pub impressions: f64,
    pub clicks: f64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

/// A campaign rolled up from its daily rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    pub total_cost: f64,
}

/// The in-memory snapshot served by the API.
///
/// Replaced wholesale on every refresh; there is no incremental update path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSet {
    pub search_terms: Vec<SearchTermRecord>,
    pub daily: Vec<DailyRecord>,

    /// When this snapshot was fetched, None if never loaded
    pub fetched_at: Option<DateTime<Utc>>,
}

impl DataSet {
    pub fn is_empty(&self) -> bool {
        self.search_terms.is_empty() && self.daily.is_empty()
    }
}
