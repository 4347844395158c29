//! Data structures for the OpenAI organization costs API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Time range covered by a costs query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    /// Unix timestamp sent as `start_time`
    pub start_time: i64,
    /// Unix timestamp of the moment the window was computed (not sent; the API defaults to now)
    pub end_time: i64,
    pub days: u32,
}

impl CostWindow {
    /// Window covering the `days` days before `now`. Clamps to chrono's earliest
    /// representable time rather than overflowing.
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Self {
        let start = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            start_time: start.timestamp(),
            end_time: now.timestamp(),
            days,
        }
    }

    pub fn last_days(days: u32) -> Self {
        Self::ending_at(Utc::now(), days)
    }
}

// ============================================================================
// OpenAI API Response Types
// ============================================================================

/// One page from the /v1/organization/costs endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CostsPage {
    #[serde(default)]
    pub object: String,
    pub data: Vec<CostBucket>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostBucket {
    #[serde(default)]
    pub object: String,
    /// Unix timestamp for start of bucket
    #[serde(default)]
    pub start_time: i64,
    /// Unix timestamp for end of bucket
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub results: Vec<CostResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    #[serde(default)]
    pub amount: CostAmount,
    #[serde(default)]
    pub line_item: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAmount {
    /// Cost in dollars
    #[serde(default, deserialize_with = "number_or_string")]
    pub value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for CostAmount {
    fn default() -> Self {
        Self {
            value: 0.0,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

/// The costs API reports amounts as JSON numbers, but decimal strings have been seen too.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        Raw::Null => Ok(0.0),
    }
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}
