//! Derived metrics calculation engine.
//!
//! Computes derived data from fetched performance rows:
//! - Per-term ratio metrics (CTR, CPC, CvR, CPA, ROAS)
//! - N-gram aggregation across search terms
//! - Campaign rollups from daily rows
//!
//! Everything here is a pure function over its arguments; callers re-run on
//! every data change rather than relying on any internal cache.

pub mod ngrams;

use std::collections::HashMap;

use crate::models::{CalculatedSearchTerm, CampaignSummary, DailyRecord, SearchTermRecord};

/// Ratio with the zero-denominator convention of the dashboard: a zero
/// denominator means "no activity" and reads as a zero rate.
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Calculate return on ad spend.
///
/// Zero spend with nonzero return is genuinely unbounded and must stay
/// distinguishable from a true zero, so it comes back as positive infinity
/// rather than being floored like the other ratios.
pub fn calculate_roas(conversion_value: f64, cost: f64) -> f64 {
    if cost == 0.0 {
        if conversion_value > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        conversion_value / cost
    }
}

/// Calculate click-through rate (clicks / impressions).
pub fn calculate_ctr(clicks: f64, impressions: f64) -> f64 {
    ratio_or_zero(clicks, impressions)
}

/// Calculate cost per click (cost / clicks).
pub fn calculate_cpc(cost: f64, clicks: f64) -> f64 {
    ratio_or_zero(cost, clicks)
}

/// Calculate conversion rate (conversions / clicks).
pub fn calculate_cvr(conversions: f64, clicks: f64) -> f64 {
    ratio_or_zero(conversions, clicks)
}

/// Calculate cost per acquisition (cost / conversions).
pub fn calculate_cpa(cost: f64, conversions: f64) -> f64 {
    ratio_or_zero(cost, conversions)
}

/// Enrich one search term row with the derived ratios.
pub fn calculate_term(record: SearchTermRecord) -> CalculatedSearchTerm {
    let ctr = calculate_ctr(record.clicks, record.impressions);
    let cpc = calculate_cpc(record.cost, record.clicks);
    let cvr = calculate_cvr(record.conversions, record.clicks);
    let cpa = calculate_cpa(record.cost, record.conversions);
    let roas = calculate_roas(record.conversion_value, record.cost);

    CalculatedSearchTerm {
        record,
        ctr,
        cpc,
        cvr,
        cpa,
        roas,
    }
}

/// Enrich every search term row, preserving input order.
///
/// Total over all finite inputs: no combination of zeros raises, and
/// degenerate values (NaN, negatives) propagate through the arithmetic
/// untouched so ingestion problems stay visible downstream.
pub fn calculate_all_terms(records: &[SearchTermRecord]) -> Vec<CalculatedSearchTerm> {
    records.iter().cloned().map(calculate_term).collect()
}

/// Roll daily rows up into per-campaign cost totals, most expensive first.
pub fn campaign_summaries(daily: &[DailyRecord]) -> Vec<CampaignSummary> {
    let mut by_id: HashMap<&str, CampaignSummary> = HashMap::new();

    for row in daily {
        by_id
            .entry(row.campaign_id.as_str())
            .and_modify(|c| c.total_cost += row.cost)
            .or_insert_with(|| CampaignSummary {
                id: row.campaign_id.clone(),
                name: row.campaign.clone(),
                total_cost: row.cost,
            });
    }

    let mut summaries: Vec<CampaignSummary> = by_id.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total_cost
            .total_cmp(&a.total_cost)
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}

/// A single campaign's daily rows in date order.
pub fn metrics_by_date(daily: &[DailyRecord], campaign_id: &str) -> Vec<DailyRecord> {
    let mut rows: Vec<DailyRecord> = daily
        .iter()
        .filter(|row| row.campaign_id == campaign_id)
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}
