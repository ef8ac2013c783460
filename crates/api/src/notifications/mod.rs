//! Failure notification transport.
//!
//! Handlers assemble the message content (see [`fca_core::notification`])
//! and hand it to a [`Mailer`]. [`send_to_all`] fans one message out per
//! recipient concurrently and reports every outcome.

pub mod email;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

/// Error raised by a [`Mailer`].
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// No transport is configured (`SMTP_HOST` unset).
    #[error("Mail transport is not configured")]
    NotConfigured,

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(String),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// SMTP transport-level failure (connection, authentication, rejection).
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// One HTML message to a single recipient.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Seam over the outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError>;
}

/// Mailer used when no SMTP host is configured. Every send fails with
/// [`MailError::NotConfigured`].
#[derive(Debug, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _message: OutgoingMessage) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

/// Outcome of the send to one recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResult {
    pub email: String,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Send the same subject and body to every recipient concurrently.
///
/// Results are returned in recipient order. A failed send never stops the
/// others.
pub async fn send_to_all(
    mailer: &dyn Mailer,
    recipients: &[String],
    subject: &str,
    html: &str,
) -> Vec<RecipientResult> {
    let sends = recipients.iter().map(|to| async move {
        let outcome = mailer
            .send(OutgoingMessage {
                to: to.clone(),
                subject: subject.to_string(),
                html: html.to_string(),
            })
            .await;
        match outcome {
            Ok(()) => RecipientResult {
                email: to.clone(),
                sent: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Notification send failed");
                RecipientResult {
                    email: to.clone(),
                    sent: false,
                    error: Some(e.to_string()),
                }
            }
        }
    });
    join_all(sends).await
}
