//! Shared error payload for the Lumo HTTP services
//!
//! Every service renders its errors through [`ErrorResponse`] so the mobile
//! client can switch on `code` without caring which service answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Machine-readable error codes
pub mod error_codes {
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";

    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    pub const ALREADY_IN_SESSION: &str = "ALREADY_IN_SESSION";
    pub const NOT_IN_QUEUE: &str = "NOT_IN_QUEUE";
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
    pub const NOT_A_PARTICIPANT: &str = "NOT_A_PARTICIPANT";
    pub const INVALID_SESSION_STATE: &str = "INVALID_SESSION_STATE";
    pub const DECISION_ALREADY_SUBMITTED: &str = "DECISION_ALREADY_SUBMITTED";

    pub const INSUFFICIENT_COINS: &str = "INSUFFICIENT_COINS";
    pub const LIVE_ACCESS_REQUIRED: &str = "LIVE_ACCESS_REQUIRED";
    pub const INVALID_SIGNATURE: &str = "INVALID_SIGNATURE";
    pub const UNKNOWN_PRODUCT: &str = "UNKNOWN_PRODUCT";
}

/// Error categories, rendered as the `type` field
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const CONFLICT_ERROR: &str = "conflict_error";
    pub const PAYMENT_ERROR: &str = "payment_error";
    pub const RATE_LIMIT_ERROR: &str = "rate_limit_error";
    pub const SERVER_ERROR: &str = "server_error";
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short HTTP reason ("Not Found")
    pub error: String,
    /// Human-readable message
    pub message: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Reason phrase for the status codes the services emit
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Error",
    }
}
