use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;

use crate::errors::FcmError;
use crate::models::*;
use crate::PushSender;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
/// Refresh cached tokens this many seconds before they expire
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Firebase Cloud Messaging HTTP v1 client
pub struct FcmClient {
    credentials: ServiceAccountKey,
    endpoint: String,
    token_cache: Mutex<Option<CachedToken>>,
    http_client: reqwest::Client,
}

impl FcmClient {
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            credentials,
            endpoint: FCM_ENDPOINT.to_string(),
            token_cache: Mutex::new(None),
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Point the client at a different API host (emulators, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.credentials.project_id
        )
    }

    /// Access token for the FCM API, served from cache while it is fresh
    pub async fn access_token(&self) -> Result<String, FcmError> {
        let mut cache = self.token_cache.lock().await;
        let now = Utc::now().timestamp();

        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + TOKEN_REFRESH_MARGIN_SECS {
                return Ok(cached.access_token.clone());
            }
        }

        let assertion = self.signed_assertion(now)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FcmError::TokenRequestFailed(response.status().as_u16()));
        }

        let token: GoogleTokenResponse = response.json().await?;
        *cache = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });

        tracing::debug!(expires_in = token.expires_in, "Refreshed FCM access token");
        Ok(token.access_token)
    }

    fn signed_assertion(&self, now: i64) -> Result<String, FcmError> {
        let claims = JwtClaims {
            iss: &self.credentials.client_email,
            sub: &self.credentials.client_email,
            scope: OAUTH_SCOPE,
            aud: &self.credentials.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| FcmError::InvalidCredentials(e.to_string()))?;

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

/// Map a non-2xx FCM response to an outcome.
///
/// `UNREGISTERED` (or a 404) means the app was uninstalled or the token
/// rotated; an `INVALID_ARGUMENT` that names the token means it was never
/// valid. Everything else is a transient or server-side failure.
pub(crate) fn classify_failure(status: u16, body: &str) -> SendOutcome {
    let parsed = serde_json::from_str::<FcmErrorEnvelope>(body).ok();

    let error_code = parsed
        .as_ref()
        .and_then(|env| env.error.details.iter().find_map(|d| d.error_code.clone()));

    match error_code.as_deref() {
        Some("UNREGISTERED") => return SendOutcome::InvalidToken,
        Some("INVALID_ARGUMENT") if body.contains("registration token") => {
            return SendOutcome::InvalidToken
        }
        _ => {}
    }

    if status == 404 {
        return SendOutcome::InvalidToken;
    }

    let message = parsed
        .map(|env| match env.error.status {
            Some(s) => format!("{}: {}", s, env.error.message),
            None => env.error.message,
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    SendOutcome::Failed(format!("{} {}", status, message))
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<SendOutcome, FcmError> {
        let access_token = self.access_token().await?;

        let request = FcmRequest {
            message: FcmMessage {
                token: device_token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
            },
        };

        let response = self
            .http_client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: FcmSendResponse = response.json().await?;
            return Ok(SendOutcome::Delivered {
                message_id: body.name.unwrap_or_default(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        Ok(classify_failure(status.as_u16(), &text))
    }
}
