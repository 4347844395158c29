//! OpenAI Usage API integration for fetching organization costs.
//!
//! This module provides:
//! - API client for the organization costs endpoint, following pagination
//! - Data structures for cost pages and the accumulated summary
//!
//! Requires an OpenAI Admin API key with `api.usage.read` permission.

mod client;
mod summary;
mod types;

pub use client::CostsClient;
pub use summary::{CostEntry, CostSummary};
pub use types::{CostAmount, CostBucket, CostResult, CostWindow, CostsPage};
