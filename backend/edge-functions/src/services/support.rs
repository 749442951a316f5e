use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::repository::support;
use crate::services::mailer::Mailer;
use crate::services::rate_limit::RateLimiter;

#[derive(Debug, Deserialize, Validate)]
pub struct SupportRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    #[validate(email)]
    pub contact_email: Option<String>,
}

impl SupportRequest {
    /// Trimmed copy; a blank contact email counts as none
    fn normalized(self) -> Self {
        Self {
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            contact_email: self
                .contact_email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupportReceipt {
    pub ticket_id: Uuid,
    pub emailed: bool,
}

pub struct SupportService {
    pool: PgPool,
    mailer: Mailer,
    limiter: RateLimiter,
    inbox: String,
}

impl SupportService {
    pub fn new(pool: PgPool, mailer: Mailer, limiter: RateLimiter, inbox: String) -> Self {
        Self {
            pool,
            mailer,
            limiter,
            inbox,
        }
    }

    /// Store the ticket, then mail it to the support inbox. A mail failure
    /// leaves the ticket stored with `emailed_at` unset.
    pub async fn submit(&self, user_id: Uuid, request: SupportRequest) -> AppResult<SupportReceipt> {
        let request = request.normalized();
        request.validate()?;

        if !self.limiter.allow(user_id).await {
            metrics::record_support_request("rate_limited");
            return Err(AppError::RateLimited(
                "too many support requests, try again later".to_string(),
            ));
        }

        let subject = request.subject.as_str();
        let message = request.message.as_str();
        let contact = request.contact_email.as_deref();

        let ticket_id = support::insert(&self.pool, user_id, subject, message, contact).await?;

        let body = format!(
            "Ticket: {}\nUser: {}\nContact: {}\n\n{}",
            ticket_id,
            user_id,
            contact.unwrap_or("-"),
            message
        );
        let emailed = match self
            .mailer
            .send(&self.inbox, contact, &format!("[Support] {}", subject), body)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!(ticket_id = %ticket_id, error = %e, "Support email failed; ticket kept");
                false
            }
        };

        if emailed {
            support::mark_emailed(&self.pool, ticket_id, Utc::now()).await?;
        }
        metrics::record_support_request("accepted");
        info!(ticket_id = %ticket_id, user_id = %user_id, emailed, "Support ticket created");

        Ok(SupportReceipt { ticket_id, emailed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(subject: &str, message: &str, email: Option<&str>) -> SupportRequest {
        SupportRequest {
            subject: subject.to_string(),
            message: message.to_string(),
            contact_email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_validation() {
        assert!(request("Billing", "I was charged twice", Some("me@example.com"))
            .validate()
            .is_ok());
        assert!(request("Billing", "I was charged twice", None).validate().is_ok());
        assert!(request("", "body", None).validate().is_err());
        assert!(request("Subject", "", None).validate().is_err());
        assert!(request("Subject", "body", Some("not-an-email")).validate().is_err());
        assert!(request(&"x".repeat(201), "body", None).validate().is_err());
    }

    #[test]
    fn test_blank_fields_rejected_after_trim() {
        assert!(request("   ", "body", None).normalized().validate().is_err());
        assert!(request("Subject", " \n\t ", None).normalized().validate().is_err());

        let trimmed = request("  Billing ", " charged twice\n", Some("  ")).normalized();
        assert_eq!(trimmed.subject, "Billing");
        assert_eq!(trimmed.message, "charged twice");
        assert!(trimmed.contact_email.is_none());
        assert!(trimmed.validate().is_ok());
    }
}
