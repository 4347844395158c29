//! OpenAI organization costs API client.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::summary::{format_timestamp, CostSummary};
use super::types::{ApiErrorResponse, CostWindow, CostsPage};
use crate::admin_key::AdminKey;
use crate::error::PollerError;

/// Client for `GET {base_url}/organization/costs`.
pub struct CostsClient {
    http: Client,
    base_url: String,
    admin_key: AdminKey,
}

impl CostsClient {
    /// Build a client. `timeout` of None keeps reqwest's default.
    pub fn new(
        base_url: &str,
        admin_key: AdminKey,
        timeout: Option<Duration>,
    ) -> Result<Self, PollerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PollerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_key,
        })
    }

    pub fn costs_url(&self) -> String {
        format!("{}/organization/costs", self.base_url)
    }

    /// Fetch a single page of costs starting at `start_time`.
    pub async fn fetch_page(
        &self,
        start_time: i64,
        page: Option<&str>,
    ) -> Result<CostsPage, PollerError> {
        let mut query: Vec<(&str, String)> = vec![("start_time", start_time.to_string())];
        if let Some(cursor) = page {
            query.push(("page", cursor.to_string()));
        }

        let response = self
            .http
            .get(self.costs_url())
            .query(&query)
            .header("Authorization", format!("Bearer {}", self.admin_key.expose()))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| PollerError::Network(format!("fetching costs: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PollerError::Network(format!("reading costs response: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            log::error!("OpenAI API error ({}): {}", status.as_u16(), message);
            return Err(PollerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<CostsPage>(&body).map_err(|e| PollerError::Parse(e.to_string()))
    }

    /// Fetch every page for `window` and fold them into a summary.
    ///
    /// Nothing is returned unless every page succeeded.
    pub async fn fetch_all(&self, window: &CostWindow) -> Result<CostSummary, PollerError> {
        log::info!(
            "Querying cost data from {} to now ({} days)",
            format_timestamp(window.start_time),
            window.days
        );

        let mut summary = CostSummary::new(window.days);
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(window.start_time, cursor.as_deref()).await?;
            pages += 1;
            summary.accumulate(&page);

            if !page.has_more {
                break;
            }

            let next = page.next_page.filter(|c| !c.is_empty()).ok_or_else(|| {
                PollerError::Pagination("has_more is true but next_page is missing".into())
            })?;
            if !seen_cursors.insert(next.clone()) {
                return Err(PollerError::Pagination(format!(
                    "server repeated page cursor {:?}",
                    next
                )));
            }

            log::debug!("More data available, fetching page {}", pages + 1);
            cursor = Some(next);
        }

        log::info!(
            "Fetched {} page(s): total ${:.6} USD across {} entries",
            pages,
            summary.total_cost,
            summary.entry_count
        );
        Ok(summary)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 => "Invalid API key".to_string(),
        403 => "API key lacks usage read permission".to_string(),
        429 => "Rate limited - try again later".to_string(),
        _ => match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body.to_string(),
        },
    }
}
