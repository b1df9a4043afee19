//! # Term Agent
//!
//! Local search term analytics for ad campaign exports.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (rows, derived metrics, n-grams, sort keys)
//! - **fetch**: Retrieval of sheet tabs from the upstream endpoint
//! - **ingest**: Typed row parsing and dataset loading
//! - **calculate**: Derived metrics and n-gram aggregation
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod models;

pub use models::*;
