/// Configuration for the matchmaking service
///
/// Loaded from environment variables (a `.env` file is read first when present).
use anyhow::{bail, Context, Result};
use chrono::Duration;
use db_pool::DbConfig;
use sfu_token::SfuCredentials;
use std::str::FromStr;

use crate::domain::{CallPolicy, ReaperPolicy};

pub const SERVICE_NAME: &str = "matchmaking-service";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub call: CallPolicy,
    pub reaper: ReaperConfig,
    pub sfu: SfuCredentials,
    pub push: PushConfig,
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
    /// HS256 secret the auth backend signs access tokens with
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

#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub interval: std::time::Duration,
    pub policy: ReaperPolicy,
}

/// Where "new match" pushes are handed off (edge-functions `/internal/push`)
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub dispatch_url: Option<String>,
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

fn env_secs(key: &str, default: Duration) -> Result<Duration> {
    let secs: i64 = env_parse(key, default.num_seconds())?;
    if secs <= 0 {
        bail!("{} must be a positive number of seconds", key);
    }
    Ok(Duration::seconds(secs))
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT", 8090)?,
            admin_token: env_opt("INTERNAL_ADMIN_TOKEN"),
        };

        let database = DbConfig::from_env(SERVICE_NAME).map_err(anyhow::Error::msg)?;

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?,
            jwt_audience: env_opt("JWT_AUDIENCE"),
        };

        let defaults = CallPolicy::default();
        let call = CallPolicy {
            call_duration: env_secs("RANDOM_CALL_DURATION_SECS", defaults.call_duration)?,
            decision_window: env_secs("RANDOM_CALL_DECISION_WINDOW_SECS", defaults.decision_window)?,
            max_rounds: env_parse("RANDOM_CALL_MAX_ROUNDS", defaults.max_rounds)?,
            connect_timeout: env_secs("RANDOM_CALL_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            rematch_cooldown: env_secs("RANDOM_CALL_REMATCH_COOLDOWN_SECS", defaults.rematch_cooldown)?,
        };
        if call.max_rounds < 1 {
            bail!("RANDOM_CALL_MAX_ROUNDS must be at least 1");
        }

        let reaper_defaults = ReaperPolicy::default();
        let reaper = ReaperConfig {
            enabled: env_flag("REAPER_ENABLED", true),
            interval: std::time::Duration::from_secs(env_parse("REAPER_INTERVAL_SECS", 60u64)?.max(1)),
            policy: ReaperPolicy {
                deciding_timeout: env_secs("REAPER_DECIDING_TIMEOUT_SECS", reaper_defaults.deciding_timeout)?,
                orphan_timeout: env_secs("REAPER_ORPHAN_TIMEOUT_SECS", reaper_defaults.orphan_timeout)?,
                heartbeat_timeout: env_secs("QUEUE_HEARTBEAT_TIMEOUT_SECS", reaper_defaults.heartbeat_timeout)?,
                active_grace: env_secs("REAPER_ACTIVE_GRACE_SECS", call.decision_window)?,
            },
        };

        let sfu = SfuCredentials {
            url: std::env::var("SFU_URL").unwrap_or_default(),
            api_key: std::env::var("SFU_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("SFU_API_SECRET").unwrap_or_default(),
        };

        let push = PushConfig {
            dispatch_url: env_opt("PUSH_DISPATCH_URL"),
        };

        Ok(Config {
            app,
            database,
            auth,
            call,
            reaper,
            sfu,
            push,
        })
    }
}
