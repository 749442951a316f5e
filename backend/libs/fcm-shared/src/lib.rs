//! Firebase Cloud Messaging client shared by the Lumo services
//!
//! - OAuth2 access tokens minted from a Google service account and cached
//!   until shortly before expiry
//! - Data + notification messages to individual device tokens
//! - Per-token outcomes so callers can prune tokens the provider no longer
//!   accepts
//!
//! Services depend on [`PushSender`] rather than the concrete client.

pub mod client;
pub mod errors;
pub mod models;

pub use client::FcmClient;
pub use errors::FcmError;
pub use models::{MulticastReport, PushMessage, SendOutcome, ServiceAccountKey};

use async_trait::async_trait;

/// Anything that can deliver a push message to device tokens
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, message: &PushMessage)
        -> Result<SendOutcome, FcmError>;

    /// Send to every token, collecting per-token outcomes. Transport errors
    /// for a single token are recorded as failures, not propagated.
    async fn send_multicast(&self, device_tokens: &[String], message: &PushMessage) -> MulticastReport {
        let mut report = MulticastReport::default();
        for token in device_tokens {
            let outcome = match self.send(token, message).await {
                Ok(outcome) => outcome,
                Err(e) => SendOutcome::Failed(e.to_string()),
            };
            report.record(token, outcome);
        }
        report
    }
}
