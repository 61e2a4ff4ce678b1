//! JSON-file-backed notification history

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{error, warn};

use super::models::{HistoryStats, NotificationInput, NotificationRecord, NotificationStatus};
use super::store::NotificationStore;

/// The log never holds more than this many records; the oldest is evicted.
const MAX_RECORDS: usize = 100;

#[derive(Serialize, Deserialize, Default)]
struct Dump {
    notifications: Vec<NotificationRecord>,
}

/// File-backed [`NotificationStore`]: the whole history lives in a single
/// JSON document `{ "notifications": [...] }`, newest first.
///
/// Writes are serialized through an in-process mutex around the
/// read-modify-write of the backing collection. Not designed for concurrent
/// multi-process writers.
pub struct FileNotificationStore {
    file_path: PathBuf,
    dump: Mutex<Dump>,
}

impl FileNotificationStore {
    fn load_dump_from_file(file_path: &Path) -> Result<Dump> {
        let mut file = File::open(file_path)?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Opens the store, creating an empty history if the file is missing.
    /// An unparseable file is treated as empty rather than a fatal error,
    /// so reads always succeed with some valid result.
    pub fn initialize(file_path: PathBuf) -> FileNotificationStore {
        let dump = match Self::load_dump_from_file(&file_path) {
            Ok(dump) => dump,
            Err(err) => {
                if file_path.exists() {
                    warn!(
                        "Could not read notification history from {:?}, starting empty: {:#}",
                        file_path, err
                    );
                }
                Dump::default()
            }
        };
        FileNotificationStore {
            file_path,
            dump: Mutex::new(dump),
        }
    }

    fn save_dump(&self, dump: &Dump) -> Result<()> {
        let json_string = serde_json::to_string_pretty(dump)?;
        let mut file = File::create(&self.file_path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

impl NotificationStore for FileNotificationStore {
    fn append(&self, input: NotificationInput) -> Result<NotificationRecord> {
        let mut dump = self.dump.lock().unwrap();

        // Millisecond-timestamp id, bumped until unique within the log
        let mut id = Utc::now().timestamp_millis();
        while dump.notifications.iter().any(|n| n.id == id.to_string()) {
            id += 1;
        }

        let record = NotificationRecord {
            id: id.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: input.status,
            risk_level: input.risk_level,
            recipient: input.recipient,
            summary: input.summary,
            message_preview: input.message_preview,
            message_id: input.message_id,
            response: input.response,
            error: input.error,
        };

        dump.notifications.insert(0, record.clone());
        dump.notifications.truncate(MAX_RECORDS);

        // A lost history entry must not fail an alert that may already have
        // been delivered; the caller never sees persistence errors.
        if let Err(err) = self.save_dump(&dump) {
            error!("Failed to persist notification history: {:#}", err);
        }

        Ok(record)
    }

    fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>> {
        let dump = self.dump.lock().unwrap();
        Ok(dump.notifications.iter().take(limit).cloned().collect())
    }

    fn by_status(&self, status: NotificationStatus) -> Result<Vec<NotificationRecord>> {
        let dump = self.dump.lock().unwrap();
        Ok(dump
            .notifications
            .iter()
            .filter(|n| n.status == status)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<HistoryStats> {
        let dump = self.dump.lock().unwrap();
        Ok(HistoryStats::compute(&dump.notifications))
    }
}
