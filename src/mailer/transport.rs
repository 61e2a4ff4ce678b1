//! Mail transport trait and SMTP implementation

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::SmtpSettings;

/// A composed alert email, ready for submission
#[derive(Debug, Clone)]
pub struct AlertEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Transport acknowledgment for a delivered email
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: String,
    pub response: String,
}

/// Mail submission capability, injected into the dispatcher so tests can
/// substitute fakes.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check connectivity and authentication without sending anything.
    async fn verify(&self) -> Result<()>;

    /// Submit the email; returns the transport's acknowledgment data.
    async fn send(&self, email: &AlertEmail) -> Result<SendReceipt>;
}

/// SMTP transport backed by lettre's async client.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .with_context(|| format!("Invalid SMTP relay host: {}", settings.host))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.pass.clone(),
            ))
            .build();

        let from = settings
            .from
            .parse()
            .with_context(|| format!("Invalid sender address: {}", settings.from))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn verify(&self) -> Result<()> {
        let accepted = self
            .transport
            .test_connection()
            .await
            .context("SMTP connection test failed")?;
        if !accepted {
            bail!("SMTP server rejected the connection");
        }
        Ok(())
    }

    async fn send(&self, email: &AlertEmail) -> Result<SendReceipt> {
        let to: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", email.to))?;

        let message_id = format!("<{}@safemom>", Uuid::new_v4());
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .message_id(Some(message_id.clone()))
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))?;

        let response = self.transport.send(message).await?;
        let response_text = format!(
            "{} {}",
            response.code(),
            response.message().collect::<Vec<_>>().join(" ")
        );

        Ok(SendReceipt {
            message_id,
            response: response_text,
        })
    }
}
