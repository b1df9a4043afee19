//! Sheet tab retrieval.
//!
//! The upstream spreadsheet endpoint serves each tab as a JSON array of
//! loosely-typed row objects, selected with a `?tab=` query parameter.
//! Fetching is abstracted behind [`TabSource`] so the API and CLI can be
//! exercised against an in-memory source in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching a tab.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching tab {tab}")]
    HttpStatus { status: u16, tab: &'static str },

    #[error("tab {tab}: response is not a JSON array")]
    NotAnArray { tab: &'static str },

    #[error("no sheet URL configured")]
    NoSheetUrl,
}

/// A spreadsheet tab served by the upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Daily,
    SearchTerms,
}

impl Tab {
    /// The tab name as it appears in the `?tab=` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Daily => "daily",
            Tab::SearchTerms => "searchTerms",
        }
    }
}

/// Source of raw tab rows.
#[async_trait]
pub trait TabSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch one tab as raw JSON rows.
    async fn fetch_tab(&self, tab: Tab) -> Result<Vec<Value>, FetchError>;
}

/// Production source backed by the spreadsheet web endpoint.
#[derive(Debug)]
pub struct SheetSource {
    client: Client,
    sheet_url: String,
}

impl SheetSource {
    /// Create a source for the given sheet URL.
    pub fn new(sheet_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let sheet_url = sheet_url.into();
        if sheet_url.is_empty() {
            return Err(FetchError::NoSheetUrl);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, sheet_url })
    }
}

#[async_trait]
impl TabSource for SheetSource {
    fn name(&self) -> &'static str {
        "sheet"
    }

    async fn fetch_tab(&self, tab: Tab) -> Result<Vec<Value>, FetchError> {
        let url = format!("{}?tab={}", self.sheet_url, tab.as_str());
        debug!(tab = tab.as_str(), "fetching tab");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                tab: tab.as_str(),
            });
        }

        let body: Value = response.json().await?;
        match body {
            Value::Array(rows) => Ok(rows),
            _ => Err(FetchError::NotAnArray { tab: tab.as_str() }),
        }
    }
}

/// In-memory source for tests and offline runs.
pub struct StaticSource {
    pub daily: Vec<Value>,
    pub search_terms: Vec<Value>,
}

#[async_trait]
impl TabSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_tab(&self, tab: Tab) -> Result<Vec<Value>, FetchError> {
        Ok(match tab {
            Tab::Daily => self.daily.clone(),
            Tab::SearchTerms => self.search_terms.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_query_names() {
        assert_eq!(Tab::Daily.as_str(), "daily");
        assert_eq!(Tab::SearchTerms.as_str(), "searchTerms");
    }

    #[test]
    fn test_sheet_source_rejects_empty_url() {
        let err = SheetSource::new("", Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, FetchError::NoSheetUrl));
    }

    #[tokio::test]
    async fn test_static_source_returns_per_tab_rows() {
        let source = StaticSource {
            daily: vec![serde_json::json!({"campaign": "Brand"})],
            search_terms: vec![],
        };

        let daily = source.fetch_tab(Tab::Daily).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert!(source.fetch_tab(Tab::SearchTerms).await.unwrap().is_empty());
    }
}
