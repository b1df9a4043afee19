//! Sortable column identifiers.
//!
//! The dashboard sorts its tables by column name. Rather than looking
//! fields up through string keys, every sortable column is an enum variant
//! with an exhaustive accessor, so a new metric that misses the sort path
//! fails to compile instead of silently sorting wrong.

use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

use super::{CalculatedSearchTerm, NgramRecord};

/// Unknown sort key or direction in a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct SortKeyError {
    pub kind: &'static str,
    pub value: String,
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Apply the direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(SortKeyError {
                kind: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Sortable column of the calculated search term table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSortKey {
    SearchTerm,
    Campaign,
    AdGroup,
    Impressions,
    Clicks,
    Cost,
    Conversions,
    ConversionValue,
    Ctr,
    Cpc,
    Cvr,
    Cpa,
    Roas,
}

impl TermSortKey {
    /// Ascending comparison between two rows on this column.
    ///
    /// Numeric columns use `total_cmp`, which gives NaN and the infinities a
    /// fixed position, so sorting stays deterministic on degenerate data.
    pub fn compare(self, a: &CalculatedSearchTerm, b: &CalculatedSearchTerm) -> Ordering {
        match self {
            TermSortKey::SearchTerm => a.record.search_term.cmp(&b.record.search_term),
            TermSortKey::Campaign => a.record.campaign.cmp(&b.record.campaign),
            TermSortKey::AdGroup => a.record.ad_group.cmp(&b.record.ad_group),
            TermSortKey::Impressions => a.record.impressions.total_cmp(&b.record.impressions),
            TermSortKey::Clicks => a.record.clicks.total_cmp(&b.record.clicks),
            TermSortKey::Cost => a.record.cost.total_cmp(&b.record.cost),
            TermSortKey::Conversions => a.record.conversions.total_cmp(&b.record.conversions),
            TermSortKey::ConversionValue => a
                .record
                .conversion_value
                .total_cmp(&b.record.conversion_value),
            TermSortKey::Ctr => a.ctr.total_cmp(&b.ctr),
            TermSortKey::Cpc => a.cpc.total_cmp(&b.cpc),
            TermSortKey::Cvr => a.cvr.total_cmp(&b.cvr),
            TermSortKey::Cpa => a.cpa.total_cmp(&b.cpa),
            TermSortKey::Roas => a.roas.total_cmp(&b.roas),
        }
    }

    /// Whether this column holds text. Text columns default to ascending
    /// order in the dashboard, numeric columns to descending.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            TermSortKey::SearchTerm | TermSortKey::Campaign | TermSortKey::AdGroup
        )
    }
}

impl FromStr for TermSortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "search_term" => Ok(TermSortKey::SearchTerm),
            "campaign" => Ok(TermSortKey::Campaign),
            "ad_group" => Ok(TermSortKey::AdGroup),
            "impressions" => Ok(TermSortKey::Impressions),
            "clicks" => Ok(TermSortKey::Clicks),
            "cost" => Ok(TermSortKey::Cost),
            "conversions" => Ok(TermSortKey::Conversions),
            "conversion_value" => Ok(TermSortKey::ConversionValue),
            "ctr" => Ok(TermSortKey::Ctr),
            "cpc" => Ok(TermSortKey::Cpc),
            "cvr" => Ok(TermSortKey::Cvr),
            "cpa" => Ok(TermSortKey::Cpa),
            "roas" => Ok(TermSortKey::Roas),
            other => Err(SortKeyError {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

/// Sortable column of the n-gram table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgramSortKey {
    Ngram,
    Count,
    TotalImpressions,
    TotalClicks,
    TotalCost,
    TotalConversions,
    TotalConversionValue,
}

impl NgramSortKey {
    /// Ascending comparison between two n-gram rows on this column.
    pub fn compare(self, a: &NgramRecord, b: &NgramRecord) -> Ordering {
        match self {
            NgramSortKey::Ngram => a.ngram.cmp(&b.ngram),
            NgramSortKey::Count => a.count.cmp(&b.count),
            NgramSortKey::TotalImpressions => {
                a.total_impressions.total_cmp(&b.total_impressions)
            }
            NgramSortKey::TotalClicks => a.total_clicks.total_cmp(&b.total_clicks),
            NgramSortKey::TotalCost => a.total_cost.total_cmp(&b.total_cost),
            NgramSortKey::TotalConversions => {
                a.total_conversions.total_cmp(&b.total_conversions)
            }
            NgramSortKey::TotalConversionValue => a
                .total_conversion_value
                .total_cmp(&b.total_conversion_value),
        }
    }
}

impl FromStr for NgramSortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ngram" => Ok(NgramSortKey::Ngram),
            "count" => Ok(NgramSortKey::Count),
            "total_impressions" => Ok(NgramSortKey::TotalImpressions),
            "total_clicks" => Ok(NgramSortKey::TotalClicks),
            "total_cost" => Ok(NgramSortKey::TotalCost),
            "total_conversions" => Ok(NgramSortKey::TotalConversions),
            "total_conversion_value" => Ok(NgramSortKey::TotalConversionValue),
            other => Err(SortKeyError {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}
