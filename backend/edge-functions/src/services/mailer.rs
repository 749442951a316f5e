use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};

/// SMTP mailer, or a logger when no SMTP host is configured
#[derive(Clone)]
pub struct Mailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; support email runs in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {}", e)))?
            .port(config.smtp_port);

            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };
            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send a plain-text mail. Returns false in no-op mode.
    pub async fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        subject: &str,
        body: String,
    ) -> AppResult<bool> {
        let Some(transport) = &self.transport else {
            info!(subject, to, "Mailer in no-op mode; skipping send");
            return Ok(false);
        };

        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid recipient address: {}", e)))?;
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN);
        if let Some(reply_to) = reply_to.and_then(|r| r.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }
        let email = builder
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to send email: {}", e)))?;
        info!(subject, "Email sent");
        Ok(true)
    }
}
