//! Notification history data models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of one alert-send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Success,
    Failed,
}

/// One persisted alert-send attempt.
///
/// Records are immutable once written. A record carries either
/// `message_id` + `response` (success) or `error` (failure), matching
/// its status. Field names are camelCase on the wire and on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    /// RFC 3339 creation time, set by the store at insert time
    pub timestamp: String,
    pub status: NotificationStatus,
    /// Free-form caller label ("risky", "high", ...), not validated
    pub risk_level: String,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Truncated excerpt of the assessment text; the full text is never persisted
    pub message_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Input for appending a record; the store assigns `id` and `timestamp`.
///
/// Built via [`NotificationInput::success`] / [`NotificationInput::failure`]
/// so the status/payload invariant holds by construction.
#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub status: NotificationStatus,
    pub risk_level: String,
    pub recipient: String,
    pub summary: Option<String>,
    pub message_preview: String,
    pub message_id: Option<String>,
    pub response: Option<String>,
    pub error: Option<String>,
}

impl NotificationInput {
    pub fn success(
        risk_level: &str,
        recipient: &str,
        summary: Option<&str>,
        message_preview: String,
        message_id: String,
        response: String,
    ) -> Self {
        Self {
            status: NotificationStatus::Success,
            risk_level: risk_level.to_string(),
            recipient: recipient.to_string(),
            summary: summary.map(str::to_string),
            message_preview,
            message_id: Some(message_id),
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(
        risk_level: &str,
        recipient: &str,
        summary: Option<&str>,
        message_preview: String,
        error: String,
    ) -> Self {
        Self {
            status: NotificationStatus::Failed,
            risk_level: risk_level.to_string(),
            recipient: recipient.to_string(),
            summary: summary.map(str::to_string),
            message_preview,
            message_id: None,
            response: None,
            error: Some(error),
        }
    }
}

/// Aggregate statistics over the stored history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage string with two decimals and a trailing "%", or exactly
    /// "0%" when the history is empty
    pub success_rate: String,
    pub risk_level_counts: HashMap<String, usize>,
}

impl HistoryStats {
    pub fn compute(records: &[NotificationRecord]) -> Self {
        let total = records.len();
        let successful = records
            .iter()
            .filter(|n| n.status == NotificationStatus::Success)
            .count();
        let failed = records
            .iter()
            .filter(|n| n.status == NotificationStatus::Failed)
            .count();

        let mut risk_level_counts: HashMap<String, usize> = HashMap::new();
        for record in records {
            *risk_level_counts.entry(record.risk_level.clone()).or_insert(0) += 1;
        }

        let success_rate = if total > 0 {
            format!("{:.2}%", successful as f64 / total as f64 * 100.0)
        } else {
            "0%".to_string()
        };

        Self {
            total,
            successful,
            failed,
            success_rate,
            risk_level_counts,
        }
    }
}
