use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    LikeService, MatchNotifier, Matchmaker, NoopNotifier, PushDispatchNotifier, Reaper,
    SessionService,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Arc<Matchmaker>,
    pub sessions: Arc<SessionService>,
    pub reaper: Arc<Reaper>,
    pub likes: Arc<LikeService>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let notifier: Arc<dyn MatchNotifier> = match &config.push.dispatch_url {
            Some(url) => Arc::new(PushDispatchNotifier::new(
                url.clone(),
                config.app.admin_token.clone(),
            )),
            None => Arc::new(NoopNotifier),
        };
        Self::with_notifier(pool, config, notifier)
    }

    pub fn with_notifier(pool: PgPool, config: &Config, notifier: Arc<dyn MatchNotifier>) -> Self {
        Self {
            matchmaker: Arc::new(Matchmaker::new(
                pool.clone(),
                config.call.clone(),
                config.reaper.policy.clone(),
            )),
            sessions: Arc::new(SessionService::new(
                pool.clone(),
                config.call.clone(),
                config.sfu.clone(),
                notifier.clone(),
            )),
            reaper: Arc::new(Reaper::new(
                pool.clone(),
                config.call.clone(),
                config.reaper.policy.clone(),
            )),
            likes: Arc::new(LikeService::new(pool, notifier)),
            admin_token: config.app.admin_token.clone(),
        }
    }
}
