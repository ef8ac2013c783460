//! SMTP delivery via `lettre`.
//!
//! [`SmtpMailer`] builds its async transport lazily on the first send,
//! behind a [`tokio::sync::OnceCell`], so concurrent first sends share one
//! initialisation. If `SMTP_HOST` is not set, [`EmailConfig::from_env`]
//! returns `None` and a [`DisabledMailer`](super::DisabledMailer) is used
//! instead.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::OnceCell;

use super::{MailError, Mailer, OutgoingMessage};

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "fca-noreply@localhost";

/// Configuration for the SMTP transport.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      |                         |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `fca-noreply@localhost` |
    /// | `SMTP_USER`     | no       |                         |
    /// | `SMTP_PASSWORD` | no       |                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends HTML notification emails over SMTP.
pub struct SmtpMailer {
    config: EmailConfig,
    transport: OnceCell<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            transport: OnceCell::new(),
        }
    }

    async fn transport(&self) -> Result<&AsyncSmtpTransport<Tokio1Executor>, MailError> {
        self.transport
            .get_or_try_init(|| async {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                        .map_err(|e| MailError::Transport(e.to_string()))?
                        .port(self.config.smtp_port);

                if let (Some(user), Some(pass)) =
                    (&self.config.smtp_user, &self.config.smtp_password)
                {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }

                tracing::info!(
                    host = %self.config.smtp_host,
                    port = self.config.smtp_port,
                    "SMTP transport initialised",
                );
                Ok(builder.build())
            })
            .await
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError> {
        let email = build_message(&self.config.from_address, &message)?;
        let transport = self.transport().await?;
        transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(to = %message.to, "Notification email sent");
        Ok(())
    }
}

fn build_message(from: &str, message: &OutgoingMessage) -> Result<Message, MailError> {
    let from = from
        .parse::<Mailbox>()
        .map_err(|e| MailError::Address(e.to_string()))?;
    let to = message
        .to
        .parse::<Mailbox>()
        .map_err(|e| MailError::Address(e.to_string()))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}
