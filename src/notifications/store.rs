//! Notification history storage trait

use anyhow::Result;

use super::models::{HistoryStats, NotificationInput, NotificationRecord, NotificationStatus};

/// Append-only, size-bounded log of alert-send attempts.
///
/// Implementations keep records newest first and enforce a 100-record cap:
/// inserting the 101st record evicts the oldest, regardless of status.
pub trait NotificationStore: Send + Sync {
    /// Append an attempt. Assigns `id` and `timestamp`, inserts at the head,
    /// truncates to the most recent 100 entries, persists, and returns the
    /// stored record.
    fn append(&self, input: NotificationInput) -> Result<NotificationRecord>;

    /// At most `limit` records, newest first. Does not mutate state.
    fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>>;

    /// All records with the given status, newest first.
    fn by_status(&self, status: NotificationStatus) -> Result<Vec<NotificationRecord>>;

    /// Aggregate statistics over the full stored history.
    fn stats(&self) -> Result<HistoryStats>;
}
