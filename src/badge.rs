//! shields.io endpoint badges for the cost summary.
//!
//! See <https://shields.io/badges/endpoint-badge> for the schema.

use serde::{Deserialize, Serialize};

use crate::usage::CostSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

impl Badge {
    pub fn new(label: impl Into<String>, message: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            schema_version: 1,
            label: label.into(),
            message: message.into(),
            color: color.into(),
        }
    }
}

pub fn cost_badge(summary: &CostSummary, color: &str) -> Badge {
    Badge::new(
        format!("Total Cost for Last {} Days", summary.lookback_days),
        format!("${:.6} USD", summary.total_cost),
        color,
    )
}

pub fn entry_badge(summary: &CostSummary, color: &str) -> Badge {
    Badge::new(
        format!("Total Entries for Last {} Days", summary.lookback_days),
        summary.entry_count.to_string(),
        color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total_cost: f64, entry_count: usize) -> CostSummary {
        CostSummary {
            lookback_days: 30,
            total_cost,
            entry_count,
            entries: Vec::new(),
        }
    }

    #[test]
    fn test_cost_badge_message_has_six_decimals() {
        let badge = cost_badge(&summary(12.3456789, 4), "blue");
        assert_eq!(badge.label, "Total Cost for Last 30 Days");
        assert_eq!(badge.message, "$12.345679 USD");
        assert_eq!(badge.color, "blue");
        assert_eq!(badge.schema_version, 1);
    }

    #[test]
    fn test_entry_badge_counts_entries() {
        let badge = entry_badge(&summary(0.0, 17), "yellow");
        assert_eq!(badge.label, "Total Entries for Last 30 Days");
        assert_eq!(badge.message, "17");
    }

    #[test]
    fn test_badge_serializes_camel_case() {
        let json = serde_json::to_value(Badge::new("a", "b", "c")).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert!(json.get("schema_version").is_none());
    }
}
