use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::FcmError;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Firebase service account key (the JSON downloaded from the console)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, FcmError> {
        let key: Self =
            serde_json::from_str(raw).map_err(|e| FcmError::InvalidCredentials(e.to_string()))?;
        if key.private_key.is_empty() || key.client_email.is_empty() {
            return Err(FcmError::InvalidCredentials(
                "private_key and client_email are required".to_string(),
            ));
        }
        Ok(key)
    }
}

/// What the app shows plus the string map it routes on
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Result of delivering to one device token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered { message_id: String },
    /// The provider no longer accepts this token; the caller should drop it
    InvalidToken,
    Failed(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MulticastReport {
    pub delivered: usize,
    pub failed: usize,
    #[serde(skip)]
    pub invalid_tokens: Vec<String>,
}

impl MulticastReport {
    pub fn record(&mut self, token: &str, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Delivered { .. } => self.delivered += 1,
            SendOutcome::InvalidToken => {
                self.failed += 1;
                self.invalid_tokens.push(token.to_string());
            }
            SendOutcome::Failed(reason) => {
                tracing::debug!(reason = %reason, "push delivery failed");
                self.failed += 1;
            }
        }
    }

    pub fn merge(&mut self, other: MulticastReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.invalid_tokens.extend(other.invalid_tokens);
    }
}

// Wire types for the HTTP v1 API

#[derive(Debug, Serialize)]
pub(crate) struct JwtClaims<'a> {
    pub iss: &'a str,
    pub sub: &'a str,
    pub scope: &'a str,
    pub aud: &'a str,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub access_token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FcmRequest<'a> {
    pub message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FcmMessage<'a> {
    pub token: &'a str,
    pub notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "no_data")]
    pub data: &'a HashMap<String, String>,
}

fn no_data(data: &&HashMap<String, String>) -> bool {
    data.is_empty()
}

#[derive(Debug, Serialize)]
pub(crate) struct FcmNotification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FcmSendResponse {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FcmErrorEnvelope {
    pub error: FcmErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FcmErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FcmErrorDetail {
    #[serde(default)]
    pub error_code: Option<String>,
}
