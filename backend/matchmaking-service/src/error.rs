use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::{error_codes, error_types as kinds, reason_phrase, ErrorResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::SessionError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("session not found")]
    SessionNotFound,

    #[error("not in the random-call queue")]
    NotInQueue,

    #[error("already in an active random-call session")]
    AlreadyInSession { session_id: Uuid },

    #[error(transparent)]
    Session(#[from] SessionError),

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

impl From<sfu_token::TokenError> for AppError {
    fn from(err: sfu_token::TokenError) -> Self {
        match err {
            sfu_token::TokenError::MissingCredentials => {
                AppError::ServiceUnavailable("voice rooms are not configured".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl AppError {
    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::NOT_FOUND),
            AppError::SessionNotFound => (kinds::NOT_FOUND_ERROR, error_codes::SESSION_NOT_FOUND),
            AppError::NotInQueue => (kinds::NOT_FOUND_ERROR, error_codes::NOT_IN_QUEUE),
            AppError::AlreadyInSession { .. } => (kinds::CONFLICT_ERROR, error_codes::ALREADY_IN_SESSION),
            AppError::Session(SessionError::NotParticipant) => {
                (kinds::AUTHORIZATION_ERROR, error_codes::NOT_A_PARTICIPANT)
            }
            AppError::Session(SessionError::InvalidState { .. }) => {
                (kinds::CONFLICT_ERROR, error_codes::INVALID_SESSION_STATE)
            }
            AppError::Session(SessionError::DecisionAlreadySubmitted) => {
                (kinds::CONFLICT_ERROR, error_codes::DECISION_ALREADY_SUBMITTED)
            }
            AppError::ServiceUnavailable(_) => (kinds::SERVER_ERROR, error_codes::SERVICE_UNAVAILABLE),
            AppError::Database(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::SessionNotFound | AppError::NotInQueue => {
                StatusCode::NOT_FOUND
            }
            AppError::Session(SessionError::NotParticipant) => StatusCode::FORBIDDEN,
            AppError::AlreadyInSession { .. } | AppError::Session(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.kind_and_code();

        // internals stay in the logs
        let message = match self {
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
        if let AppError::AlreadyInSession { session_id } = self {
            body = body.with_details(serde_json::json!({ "session_id": session_id }));
        }

        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionStatus;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotInQueue.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(SessionError::NotParticipant).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(SessionError::InvalidState {
                expected: "deciding",
                actual: SessionStatus::Active
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(sfu_token::TokenError::MissingCredentials).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_rt::test]
    async fn test_conflict_body_carries_session() {
        let session_id = Uuid::new_v4();
        let resp = AppError::AlreadyInSession { session_id }.error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "ALREADY_IN_SESSION");
        assert_eq!(body["details"]["session_id"], session_id.to_string());
        assert_eq!(body["type"], "conflict_error");
    }

    #[actix_rt::test]
    async fn test_database_detail_not_leaked() {
        let resp = AppError::Database("relation \"x\" does not exist".into()).error_response();
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "internal server error");
        assert_eq!(body["code"], "DATABASE_ERROR");
    }
}
