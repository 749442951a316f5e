use thiserror::Error;

#[derive(Error, Debug)]
pub enum FcmError {
    #[error("invalid service account: {0}")]
    InvalidCredentials(String),

    #[error("failed to sign OAuth2 assertion: {0}")]
    JwtEncode(#[from] jsonwebtoken::errors::Error),

    #[error("token request failed with status {0}")]
    TokenRequestFailed(u16),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("FCM API error {status}: {message}")]
    Api { status: u16, message: String },
}
