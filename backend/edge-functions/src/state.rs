use fcm_shared::{FcmClient, PushSender, ServiceAccountKey};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::services::{
    CheckoutGateway, HttpGateway, LiveService, Mailer, PaymentsService, PushService, RateLimiter,
    SupportService,
};

/// Third-party clients, each absent when its credentials are not configured
#[derive(Default)]
pub struct Integrations {
    pub gateway: Option<Arc<dyn CheckoutGateway>>,
    pub push: Option<Arc<dyn PushSender>>,
    pub redis: Option<ConnectionManager>,
}

impl Integrations {
    /// Build the clients the configuration has credentials for. Redis is
    /// connected here; failure to reach it only disables rate limiting.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let gateway: Option<Arc<dyn CheckoutGateway>> = match &config.payments.secret_key {
            Some(key) => Some(Arc::new(HttpGateway::new(&config.payments.api_base, key)?)),
            None => {
                warn!("PAYMENT_SECRET_KEY not set; checkout is disabled");
                None
            }
        };

        let push: Option<Arc<dyn PushSender>> = match &config.push.service_account_json {
            Some(raw) => {
                let key = ServiceAccountKey::from_json(raw)?;
                let client = FcmClient::new(key);
                info!(project_id = %client.project_id(), "FCM client configured");
                Some(Arc::new(client))
            }
            None => {
                warn!("FCM service account not set; push dispatch is disabled");
                None
            }
        };

        let redis = match &config.redis.url {
            Some(url) => match connect_redis(url).await {
                Ok(conn) => Some(conn),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable; support requests are not rate limited");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            gateway,
            push,
            redis,
        })
    }
}

async fn connect_redis(url: &str) -> redis::RedisResult<ConnectionManager> {
    let client = redis::Client::open(url)?;
    ConnectionManager::new(client).await
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentsService>,
    pub push: Arc<PushService>,
    pub support: Arc<SupportService>,
    pub live: Arc<LiveService>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config, integrations: Integrations) -> AppResult<Self> {
        let mailer = Mailer::new(&config.email)?;
        let limiter = RateLimiter::new(
            integrations.redis,
            "support_rate",
            config.email.max_requests_per_hour,
        );

        Ok(Self {
            payments: Arc::new(PaymentsService::new(
                pool.clone(),
                integrations.gateway,
                config.payments.clone(),
            )),
            push: Arc::new(PushService::new(pool.clone(), integrations.push)),
            support: Arc::new(SupportService::new(
                pool.clone(),
                mailer,
                limiter,
                config.email.support_inbox.clone(),
            )),
            live: Arc::new(LiveService::new(pool, config.sfu.clone())),
            admin_token: config.app.admin_token.clone(),
        })
    }
}
