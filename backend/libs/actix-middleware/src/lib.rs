//! # Actix Middleware Library
//!
//! Middleware shared by the Lumo Actix services
//!
//! ## Modules
//! - `jwt_auth`: Bearer JWT authentication (tokens issued by the auth backend, HS256)
//! - `admin`: shared-secret guard for internal endpoints
//! - `metrics`: Prometheus HTTP metrics middleware

pub mod admin;
pub mod jwt_auth;
pub mod metrics;

pub use admin::{require_admin, ADMIN_TOKEN_HEADER};
pub use jwt_auth::{Claims, JwtAuthConfig, JwtAuthMiddleware, JwtConfigError, UserId};
pub use metrics::{serve_metrics, MetricsMiddleware};
