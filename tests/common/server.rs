//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own history file and an
//! injected fake mail transport.

use anyhow::{bail, Result};
use async_trait::async_trait;
use safemom_server::mailer::{AlertDispatcher, AlertEmail, MailTransport, SendReceipt};
use safemom_server::notifications::{FileNotificationStore, NotificationStore};
use safemom_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

use super::TEST_RECIPIENT;

const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Fake mail transport for testing - records sent emails, optionally fails
pub struct FakeMailTransport {
    pub fail_verify: bool,
    pub fail_send: bool,
    /// Every email accepted by `send`, in submission order
    pub sent: Mutex<Vec<AlertEmail>>,
}

impl FakeMailTransport {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail_verify: false,
            fail_send: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_send() -> Arc<Self> {
        Arc::new(Self {
            fail_verify: false,
            fail_send: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_verify() -> Arc<Self> {
        Arc::new(Self {
            fail_verify: true,
            fail_send: false,
            sent: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MailTransport for FakeMailTransport {
    async fn verify(&self) -> Result<()> {
        if self.fail_verify {
            bail!("connection refused");
        }
        Ok(())
    }

    async fn send(&self, email: &AlertEmail) -> Result<SendReceipt> {
        if self.fail_send {
            bail!("550 mailbox unavailable");
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(SendReceipt {
            message_id: format!("<fake-{}@safemom>", sent.len()),
            response: "250 OK".to_string(),
        })
    }
}

/// Test server instance with an isolated history file
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Notification store for direct history access in tests
    pub store: Arc<dyn NotificationStore>,

    /// The injected fake transport, when the server is mail-configured
    pub transport: Option<Arc<FakeMailTransport>>,

    // Private fields - keep resources alive until drop
    _temp_data_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with a working fake transport
    pub async fn spawn() -> Self {
        Self::spawn_inner(Some(FakeMailTransport::working())).await
    }

    /// Spawns a server with no mail transport (credentials missing)
    pub async fn spawn_unconfigured() -> Self {
        Self::spawn_inner(None).await
    }

    /// Spawns a server with a custom fake transport
    pub async fn spawn_with_transport(transport: Arc<FakeMailTransport>) -> Self {
        Self::spawn_inner(Some(transport)).await
    }

    async fn spawn_inner(transport: Option<Arc<FakeMailTransport>>) -> Self {
        let temp_data_dir = TempDir::new().expect("Failed to create temp data dir");
        let store: Arc<dyn NotificationStore> = Arc::new(FileNotificationStore::initialize(
            temp_data_dir.path().join("notification-history.json"),
        ));

        let dispatcher = match &transport {
            Some(fake) => AlertDispatcher::with_transport(
                store.clone(),
                fake.clone() as Arc<dyn MailTransport>,
                TEST_RECIPIENT.to_string(),
            ),
            None => AlertDispatcher::new(store.clone()),
        };

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            frontend_dir_path: None,
        };
        let app = make_app(config, Arc::new(dispatcher), store.clone());

        // Spawn server in background task with graceful shutdown
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            transport,
            _temp_data_dir: temp_data_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        while start.elapsed() < timeout {
            if let Ok(response) = client.get(&self.base_url).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        panic!("Test server did not become ready within {:?}", timeout);
    }
}
