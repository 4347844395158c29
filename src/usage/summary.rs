//! Accumulation of cost pages into a single summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{CostAmount, CostsPage};

/// One cost line, tagged with the bucket it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEntry {
    pub start_time: i64,
    pub end_time: i64,
    pub amount: CostAmount,
    pub line_item: Option<String>,
    pub project_id: Option<String>,
}

/// Totals across every page of a costs query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostSummary {
    pub lookback_days: u32,
    pub total_cost: f64,
    pub entry_count: usize,
    pub entries: Vec<CostEntry>,
}

impl CostSummary {
    pub fn new(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            ..Self::default()
        }
    }

    /// Fold one page into the summary, logging each non-empty bucket.
    pub fn accumulate(&mut self, page: &CostsPage) {
        for bucket in &page.data {
            if bucket.results.is_empty() {
                continue;
            }

            log::info!(
                "Time range: {} to {}",
                format_timestamp(bucket.start_time),
                format_timestamp(bucket.end_time)
            );

            for result in &bucket.results {
                log::info!(
                    "  - Cost: ${:.6} {} | line item: {} | project: {}",
                    result.amount.value,
                    result.amount.currency.to_uppercase(),
                    result.line_item.as_deref().unwrap_or("N/A"),
                    result.project_id.as_deref().unwrap_or("N/A")
                );

                self.total_cost += result.amount.value;
                self.entries.push(CostEntry {
                    start_time: bucket.start_time,
                    end_time: bucket.end_time,
                    amount: result.amount.clone(),
                    line_item: result.line_item.clone(),
                    project_id: result.project_id.clone(),
                });
            }
        }
        self.entry_count = self.entries.len();
    }
}

pub(crate) fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::types::CostsPage;

    fn page(json: &str) -> CostsPage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accumulate_sums_across_pages() {
        let mut summary = CostSummary::new(30);
        summary.accumulate(&page(
            r#"{"data": [
                {"start_time": 0, "end_time": 86400, "results": [
                    {"amount": {"value": 1.5, "currency": "usd"}, "line_item": "gpt-4o, input"},
                    {"amount": {"value": 0.25, "currency": "usd"}}
                ]},
                {"start_time": 86400, "end_time": 172800, "results": []}
            ], "has_more": true, "next_page": "p2"}"#,
        ));
        summary.accumulate(&page(
            r#"{"data": [
                {"start_time": 172800, "end_time": 259200, "results": [
                    {"amount": {"value": 2.0, "currency": "usd"}, "project_id": "proj_1"}
                ]}
            ]}"#,
        ));

        assert!((summary.total_cost - 3.75).abs() < 1e-9);
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.entries[2].start_time, 172800);
        assert_eq!(summary.entries[2].project_id.as_deref(), Some("proj_1"));
    }

    #[test]
    fn test_empty_page_leaves_summary_untouched() {
        let mut summary = CostSummary::new(7);
        summary.accumulate(&page(r#"{"data": []}"#));
        assert_eq!(summary, CostSummary::new(7));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1730419200), "2024-11-01 00:00:00");
    }
}
