//! Risk-alert dispatch: compose, verify, send, record

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::notifications::{NotificationInput, NotificationStore};

use super::transport::{AlertEmail, MailTransport};

/// Longest persisted excerpt of the assessment text
const PREVIEW_MAX_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("riskLevel is required")]
    MissingRiskLevel,
    #[error("Email not configured. Set SMTP_USER and SMTP_PASS in the environment")]
    TransportNotConfigured,
    #[error("SMTP transporter verify failed: {0}")]
    VerificationFailed(String),
    #[error("{0}")]
    SendFailed(String),
}

/// Acknowledgment returned to the caller on a successful send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertAck {
    pub message_id: String,
    pub response: String,
    pub recipient: String,
}

/// Turns a risk classification into a best-effort email notification and a
/// durable record of the attempt.
///
/// Every alert goes to one fixed, statically-configured recipient regardless
/// of which caller triggered it. There is no retry policy: callers own
/// re-submission.
pub struct AlertDispatcher {
    transport: Option<Arc<dyn MailTransport>>,
    recipient: String,
    store: Arc<dyn NotificationStore>,
}

impl AlertDispatcher {
    /// Dispatcher without a mail transport; every alert request fails fast
    /// with [`AlertError::TransportNotConfigured`].
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            transport: None,
            recipient: String::new(),
            store,
        }
    }

    pub fn with_transport(
        store: Arc<dyn NotificationStore>,
        transport: Arc<dyn MailTransport>,
        recipient: String,
    ) -> Self {
        Self {
            transport: Some(transport),
            recipient,
            store,
        }
    }

    /// Send a risk alert and record the outcome.
    ///
    /// Caller-input and configuration errors stop processing before any
    /// network or storage side effect. Verification failures short-circuit
    /// before composing and are not recorded in history; send outcomes
    /// (success or failure) always append exactly one record.
    pub async fn send_risk_alert(
        &self,
        risk_level: &str,
        summary: Option<&str>,
        message: Option<&str>,
    ) -> Result<AlertAck, AlertError> {
        if risk_level.is_empty() {
            return Err(AlertError::MissingRiskLevel);
        }

        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => {
                info!("Risk alert requested but email is not configured (SMTP_USER/SMTP_PASS missing)");
                return Err(AlertError::TransportNotConfigured);
            }
        };

        if let Err(err) = transport.verify().await {
            error!("SMTP transporter verify failed: {:#}", err);
            return Err(AlertError::VerificationFailed(err.to_string()));
        }
        info!("SMTP transporter verified");

        let email = compose_alert_email(&self.recipient, risk_level, summary, message);
        let preview = message.map(message_preview).unwrap_or_default();

        match transport.send(&email).await {
            Ok(receipt) => {
                info!(
                    "Risk alert email sent to {} (message id {})",
                    self.recipient, receipt.message_id
                );
                self.record(NotificationInput::success(
                    risk_level,
                    &self.recipient,
                    summary,
                    preview,
                    receipt.message_id.clone(),
                    receipt.response.clone(),
                ));
                Ok(AlertAck {
                    message_id: receipt.message_id,
                    response: receipt.response,
                    recipient: self.recipient.clone(),
                })
            }
            Err(err) => {
                error!("Risk alert email failed: {:#}", err);
                let text = err.to_string();
                self.record(NotificationInput::failure(
                    risk_level,
                    &self.recipient,
                    summary,
                    preview,
                    text.clone(),
                ));
                Err(AlertError::SendFailed(text))
            }
        }
    }

    // A lost history entry is acceptable; dropping a delivered alert's
    // acknowledgment to the caller is not.
    fn record(&self, input: NotificationInput) {
        if let Err(err) = self.store.append(input) {
            warn!("Failed to record notification outcome: {:#}", err);
        }
    }
}

fn compose_alert_email(
    recipient: &str,
    risk_level: &str,
    summary: Option<&str>,
    message: Option<&str>,
) -> AlertEmail {
    let summary = summary.filter(|s| !s.is_empty());
    let message = message.filter(|m| !m.is_empty());

    let subject = format!("[SafeMom] High risk identified: {}", risk_level);

    let mut text_lines = vec![format!("Risk level: {}", risk_level)];
    if let Some(summary) = summary {
        text_lines.push(format!("Vitals summary: {}", summary));
    }
    if let Some(message) = message {
        text_lines.push(format!("\nAI assessment:\n{}", message));
    }
    let text = text_lines.join("\n");

    let mut html = format!(
        "<h2>SafeMom – High risk identified</h2>\n<p><strong>Risk level:</strong> {}</p>",
        risk_level
    );
    if let Some(summary) = summary {
        html.push_str(&format!(
            "\n<p><strong>Vitals summary:</strong> {}</p>",
            summary
        ));
    }
    if let Some(message) = message {
        // The assessment is attacker/AI-controlled free text rendered as HTML
        html.push_str(&format!(
            "\n<h3>AI assessment</h3><pre style=\"white-space:pre-wrap;\">{}</pre>",
            escape_html(message)
        ));
    }
    html.push_str(
        "\n<p><em>This is an automated alert from SafeMom. Please follow up with the mother/patient.</em></p>",
    );

    AlertEmail {
        to: recipient.to_string(),
        subject,
        text,
        html,
    }
}

/// First 100 characters of the message; an ellipsis is appended only when
/// truncation actually occurred.
fn message_preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
