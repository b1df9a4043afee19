//! N-gram aggregation models.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Requested n-gram width is outside the supported set.
///
/// Widths are never clamped: silently changing the analysis width would
/// produce misleading aggregates, so a bad width fails at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported n-gram width {0}: must be 1, 2, or 3")]
pub struct WidthError(pub u8);

/// Supported n-gram widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NgramWidth {
    Unigram,
    Bigram,
    Trigram,
}

impl NgramWidth {
    /// Validate an integer width.
    pub fn new(width: u8) -> Result<Self, WidthError> {
        match width {
            1 => Ok(NgramWidth::Unigram),
            2 => Ok(NgramWidth::Bigram),
            3 => Ok(NgramWidth::Trigram),
            other => Err(WidthError(other)),
        }
    }

    /// Window length in tokens.
    pub fn as_usize(self) -> usize {
        match self {
            NgramWidth::Unigram => 1,
            NgramWidth::Bigram => 2,
            NgramWidth::Trigram => 3,
        }
    }
}

impl TryFrom<u8> for NgramWidth {
    type Error = WidthError;

    fn try_from(width: u8) -> Result<Self, Self::Error> {
        NgramWidth::new(width)
    }
}

impl fmt::Display for NgramWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_usize())
    }
}

/// One distinct n-gram observed across the search term corpus.
///
/// A source record contributes to a given n-gram at most once, however many
/// times the phrase repeats inside that record's search term. Totals summed
/// across all n-grams of a width therefore exceed the input totals whenever
/// a record spans multiple distinct n-grams; that is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgramRecord {
    /// Tokens joined by a single space, lower-cased
    pub ngram: String,

    /// Number of source records containing this n-gram
    pub count: u32,

    pub total_impressions: f64,
    pub total_clicks: f64,
    pub total_cost: f64,
    pub total_conversions: f64,
    pub total_conversion_value: f64,
}

impl NgramRecord {
    /// A zeroed record for the given key, ready to accumulate into.
    pub fn empty(ngram: String) -> Self {
        Self {
            ngram,
            count: 0,
            total_impressions: 0.0,
            total_clicks: 0.0,
            total_cost: 0.0,
            total_conversions: 0.0,
            total_conversion_value: 0.0,
        }
    }
}
