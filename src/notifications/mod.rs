//! Alert notification history module

mod file_store;
mod models;
mod store;

pub use file_store::FileNotificationStore;
pub use models::{HistoryStats, NotificationInput, NotificationRecord, NotificationStatus};
pub use store::NotificationStore;
