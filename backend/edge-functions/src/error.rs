use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::{error_codes, error_types as kinds, reason_phrase, ErrorResponse};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient coins: need {required}, have {balance}")]
    InsufficientCoins { required: i64, balance: i64 },

    #[error("this stream requires its join gift")]
    LiveAccessRequired,

    #[error("too many requests: {0}")]
    RateLimited(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<sfu_token::TokenError> for AppError {
    fn from(err: sfu_token::TokenError) -> Self {
        match err {
            sfu_token::TokenError::MissingCredentials => {
                AppError::ServiceUnavailable("live streaming is not configured".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl AppError {
    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
            AppError::Validation(_) => (kinds::VALIDATION_ERROR, error_codes::VALIDATION_ERROR),
            AppError::UnknownProduct(_) => (kinds::VALIDATION_ERROR, error_codes::UNKNOWN_PRODUCT),
            AppError::InvalidSignature(_) => {
                (kinds::AUTHENTICATION_ERROR, error_codes::INVALID_SIGNATURE)
            }
            AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::FORBIDDEN),
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::NOT_FOUND),
            AppError::Conflict(_) => (kinds::CONFLICT_ERROR, error_codes::INVALID_REQUEST),
            AppError::InsufficientCoins { .. } => {
                (kinds::PAYMENT_ERROR, error_codes::INSUFFICIENT_COINS)
            }
            AppError::LiveAccessRequired => (kinds::PAYMENT_ERROR, error_codes::LIVE_ACCESS_REQUIRED),
            AppError::RateLimited(_) => (kinds::RATE_LIMIT_ERROR, error_codes::RATE_LIMITED),
            AppError::Upstream(_) => (kinds::SERVER_ERROR, error_codes::UPSTREAM_ERROR),
            AppError::ServiceUnavailable(_) => (kinds::SERVER_ERROR, error_codes::SERVICE_UNAVAILABLE),
            AppError::Database(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::UnknownProduct(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InsufficientCoins { .. } | AppError::LiveAccessRequired => {
                StatusCode::PAYMENT_REQUIRED
            }
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.kind_and_code();

        // internals stay in the logs
        let message = match self {
            AppError::Upstream(detail) => {
                tracing::error!(error = %detail, "upstream call failed");
                "upstream service error".to_string()
            }
            AppError::Database(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = ErrorResponse::new(
            reason_phrase(status.as_u16()),
            &message,
            status.as_u16(),
            error_type,
            code,
        );
        if let AppError::InsufficientCoins { required, balance } = self {
            body = body.with_details(serde_json::json!({
                "required": required,
                "balance": balance,
            }));
        }

        HttpResponse::build(status).json(body)
    }
}
