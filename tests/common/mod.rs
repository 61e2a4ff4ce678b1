//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use reqwest::StatusCode;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_send_alert() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.send_risk_alert(&json!({"riskLevel": "high"})).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```
#![allow(dead_code)] // Each test binary uses a different subset

mod client;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use server::{FakeMailTransport, TestServer};

/// The fixed recipient configured for every test server
pub const TEST_RECIPIENT: &str = "clinic-alerts@example.com";
