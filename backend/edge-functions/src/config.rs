/// Configuration for the edge-functions service
///
/// Every third-party integration is optional. A missing credential turns the
/// matching endpoints into 503s instead of failing startup.
use anyhow::{Context, Result};
use db_pool::DbConfig;
use sfu_token::SfuCredentials;
use std::str::FromStr;

use crate::models::ProductCatalog;

pub const SERVICE_NAME: &str = "edge-functions";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub push: PushConfig,
    pub email: EmailConfig,
    pub redis: RedisConfig,
    pub sfu: SfuCredentials,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub http_port: u16,
    /// Shared secret for `/internal/*` endpoints
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_audience", &self.jwt_audience)
            .finish()
    }
}

#[derive(Clone)]
pub struct PaymentsConfig {
    pub api_base: String,
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    /// Allowed clock skew for webhook signatures
    pub webhook_tolerance_secs: i64,
    pub products: ProductCatalog,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[REDACTED]"))
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("products", &self.products.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct PushConfig {
    /// Service-account JSON, inline or read from `FCM_SERVICE_ACCOUNT_PATH`
    pub service_account_json: Option<String>,
}

impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("configured", &self.service_account_json.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct EmailConfig {
    /// Empty host puts the mailer in no-op mode
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub use_starttls: bool,
    pub from: String,
    pub support_inbox: String,
    pub max_requests_per_hour: u32,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "[REDACTED]"))
            .field("use_starttls", &self.use_starttls)
            .field("from", &self.from)
            .field("support_inbox", &self.support_inbox)
            .field("max_requests_per_hour", &self.max_requests_per_hour)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Rate limiting is skipped when unset
    pub url: Option<String>,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        _ => Ok(default),
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn service_account_json() -> Result<Option<String>> {
    if let Some(inline) = env_opt("FCM_SERVICE_ACCOUNT_JSON") {
        return Ok(Some(inline));
    }
    match env_opt("FCM_SERVICE_ACCOUNT_PATH") {
        Some(path) => std::fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read FCM service account file {}", path)),
        None => Ok(None),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT", 8091)?,
            admin_token: env_opt("INTERNAL_ADMIN_TOKEN"),
        };

        let database = DbConfig::from_env(SERVICE_NAME).map_err(anyhow::Error::msg)?;

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?,
            jwt_audience: env_opt("JWT_AUDIENCE"),
        };

        let products = ProductCatalog::parse(&std::env::var("PAYMENT_PRODUCTS").unwrap_or_default())
            .context("PAYMENT_PRODUCTS is malformed")?;
        let payments = PaymentsConfig {
            api_base: std::env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            secret_key: env_opt("PAYMENT_SECRET_KEY"),
            webhook_secret: env_opt("PAYMENT_WEBHOOK_SECRET"),
            success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "lumo://checkout/success".to_string()),
            cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "lumo://checkout/cancel".to_string()),
            webhook_tolerance_secs: env_parse("PAYMENT_WEBHOOK_TOLERANCE_SECS", 300)?,
            products,
        };

        let push = PushConfig {
            service_account_json: service_account_json()?,
        };

        let email = EmailConfig {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: env_parse("SMTP_PORT", 587)?,
            smtp_username: env_opt("SMTP_USERNAME"),
            smtp_password: env_opt("SMTP_PASSWORD"),
            use_starttls: env_flag("SMTP_STARTTLS", true),
            from: std::env::var("SMTP_FROM").unwrap_or_else(|_| "Lumo <no-reply@lumo.app>".to_string()),
            support_inbox: std::env::var("SUPPORT_INBOX")
                .unwrap_or_else(|_| "support@lumo.app".to_string()),
            max_requests_per_hour: env_parse("SUPPORT_MAX_REQUESTS_PER_HOUR", 5)?,
        };

        let redis = RedisConfig {
            url: env_opt("REDIS_URL"),
        };

        let sfu = SfuCredentials {
            url: std::env::var("SFU_URL").unwrap_or_default(),
            api_key: std::env::var("SFU_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("SFU_API_SECRET").unwrap_or_default(),
        };

        Ok(Config {
            app,
            database,
            auth,
            payments,
            push,
            email,
            redis,
            sfu,
        })
    }
}
