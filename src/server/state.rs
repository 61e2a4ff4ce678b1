use axum::extract::FromRef;

use crate::mailer::AlertDispatcher;
use crate::notifications::NotificationStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedNotificationStore = Arc<dyn NotificationStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub dispatcher: Arc<AlertDispatcher>,
    pub notification_store: GuardedNotificationStore,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        dispatcher: Arc<AlertDispatcher>,
        notification_store: GuardedNotificationStore,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            dispatcher,
            notification_store,
        }
    }
}

impl FromRef<ServerState> for Arc<AlertDispatcher> {
    fn from_ref(input: &ServerState) -> Self {
        input.dispatcher.clone()
    }
}

impl FromRef<ServerState> for GuardedNotificationStore {
    fn from_ref(input: &ServerState) -> Self {
        input.notification_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
