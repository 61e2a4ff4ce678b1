//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all safemom-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use reqwest::Response;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 5;

/// HTTP test client for the alert API
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// POST /api/send-risk-alert
    pub async fn send_risk_alert(&self, body: &serde_json::Value) -> Response {
        self.client
            .post(format!("{}/api/send-risk-alert", self.base_url))
            .json(body)
            .send()
            .await
            .expect("send-risk-alert request failed")
    }

    /// GET /api/notification-history, optionally with a limit parameter
    pub async fn get_history(&self, limit: Option<usize>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/api/notification-history", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        request
            .send()
            .await
            .expect("notification-history request failed")
    }

    /// GET /api/notification-stats
    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/api/notification-stats", self.base_url))
            .send()
            .await
            .expect("notification-stats request failed")
    }
}
