//! LiveKit-compatible SFU access tokens
//!
//! Tokens are HS256 JWTs signed with the SFU API secret; the `video` claim
//! carries the room grant. Call rooms are voice only (microphone is the only
//! publishable source); live-stream hosts publish camera and microphone and
//! viewers subscribe only.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TTL_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("SFU credentials not configured")]
    MissingCredentials,
    #[error("participant identity is required")]
    MissingIdentity,
    #[error("token ttl must be positive")]
    InvalidTtl,
    #[error("failed to encode claims: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid signing key")]
    InvalidKey,
}

/// SFU server location and API key pair
#[derive(Clone, Deserialize)]
pub struct SfuCredentials {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for SfuCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SfuCredentials")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl SfuCredentials {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn token(&self) -> AccessToken {
        AccessToken::new(&self.api_key, &self.api_secret)
    }
}

/// Track sources a participant may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Camera,
    Microphone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub can_publish_sources: Vec<TrackSource>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl VideoGrant {
    /// Two-way voice room: publish microphone only, subscribe to the other side
    pub fn voice(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            can_publish_sources: vec![TrackSource::Microphone],
            hidden: false,
        }
    }

    /// Broadcaster of a live stream
    pub fn broadcaster(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            can_publish_sources: vec![TrackSource::Camera, TrackSource::Microphone],
            hidden: false,
        }
    }

    /// Audience member of a live stream: receive only
    pub fn viewer(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            room_join: true,
            can_publish: false,
            can_subscribe: true,
            can_publish_data: true,
            can_publish_sources: Vec::new(),
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub video: VideoGrant,
}

/// Builder for a single participant token
#[derive(Debug, Clone)]
pub struct AccessToken {
    api_key: String,
    api_secret: String,
    identity: String,
    name: Option<String>,
    metadata: Option<String>,
    ttl: Duration,
    grant: VideoGrant,
}

impl AccessToken {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            identity: String::new(),
            name: None,
            metadata: None,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            grant: VideoGrant::default(),
        }
    }

    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Expire at `at` instead of after a fixed TTL; relative to `now` on signing
    pub fn expires_at(self, at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        self.ttl(at - now)
    }

    pub fn grant(mut self, grant: VideoGrant) -> Self {
        self.grant = grant;
        self
    }

    pub fn to_jwt(&self) -> Result<String, TokenError> {
        self.to_jwt_at(Utc::now())
    }

    pub fn to_jwt_at(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(TokenError::MissingCredentials);
        }
        if self.identity.is_empty() {
            return Err(TokenError::MissingIdentity);
        }
        if self.ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        let issued = now.timestamp();
        let claims = Claims {
            iss: self.api_key.clone(),
            sub: self.identity.clone(),
            iat: issued,
            nbf: issued,
            exp: issued + self.ttl.num_seconds(),
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            video: self.grant.clone(),
        };

        let header = BASE64_URL.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = BASE64_URL.encode(serde_json::to_vec(&claims)?);
        let message = format!("{}.{}", header, payload);

        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|_| TokenError::InvalidKey)?;
        mac.update(message.as_bytes());
        let signature = BASE64_URL.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", message, signature))
    }
}
