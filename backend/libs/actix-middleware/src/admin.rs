//! Shared-secret guard for internal endpoints (scheduled jobs, service-to-service calls)

use actix_web::{error::InternalError, Error, HttpRequest, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject the request unless it carries the configured admin token.
///
/// An unset or empty token disables the internal endpoints entirely.
pub fn require_admin(req: &HttpRequest, expected: Option<&str>) -> Result<(), Error> {
    let allowed = match expected {
        Some(token) if !token.is_empty() => req
            .headers()
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| constant_time_eq(v.as_bytes(), token.as_bytes()))
            .unwrap_or(false),
        _ => false,
    };

    if allowed {
        return Ok(());
    }

    tracing::warn!(path = %req.path(), "Rejected internal request without valid admin token");
    let body = ErrorResponse::new(
        "Forbidden",
        "admin token required",
        403,
        kinds::AUTHORIZATION_ERROR,
        error_codes::FORBIDDEN,
    );
    Err(InternalError::from_response("admin token required", HttpResponse::Forbidden().json(body)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_matching_token_allowed() {
        let req = TestRequest::default()
            .insert_header((ADMIN_TOKEN_HEADER, "s3cret"))
            .to_http_request();
        assert!(require_admin(&req, Some("s3cret")).is_ok());
    }

    #[test]
    fn test_wrong_or_missing_token_rejected() {
        let wrong = TestRequest::default()
            .insert_header((ADMIN_TOKEN_HEADER, "nope"))
            .to_http_request();
        assert!(require_admin(&wrong, Some("s3cret")).is_err());

        let missing = TestRequest::default().to_http_request();
        assert!(require_admin(&missing, Some("s3cret")).is_err());
    }

    #[test]
    fn test_unconfigured_token_disables_endpoint() {
        let req = TestRequest::default()
            .insert_header((ADMIN_TOKEN_HEADER, ""))
            .to_http_request();
        assert!(require_admin(&req, Some("")).is_err());
        assert!(require_admin(&req, None).is_err());
    }
}
