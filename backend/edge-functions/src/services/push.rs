use fcm_shared::{MulticastReport, PushMessage, PushSender};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::Platform;
use crate::repository::devices;

/// Tokens sent per provider batch
const BATCH_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub user_ids: Vec<Uuid>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub batches: usize,
    pub delivered: usize,
    pub failed: usize,
    pub pruned_tokens: u64,
}

pub struct PushService {
    pool: PgPool,
    sender: Option<Arc<dyn PushSender>>,
}

impl PushService {
    pub fn new(pool: PgPool, sender: Option<Arc<dyn PushSender>>) -> Self {
        Self { pool, sender }
    }

    pub async fn register_device(&self, user_id: Uuid, token: &str, platform: Platform) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("device token is empty".to_string()));
        }
        devices::upsert(&self.pool, token, user_id, platform).await?;
        debug!(user_id = %user_id, platform = %platform, "Device registered");
        Ok(())
    }

    pub async fn unregister_device(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        if !devices::delete_for_user(&self.pool, user_id, token).await? {
            return Err(AppError::NotFound("device not registered".to_string()));
        }
        Ok(())
    }

    /// Send to every device of `user_ids` and drop tokens the provider rejects
    pub async fn dispatch(&self, request: PushRequest) -> AppResult<PushReport> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("push is not configured".to_string()))?;
        if request.user_ids.is_empty() {
            return Ok(PushReport::default());
        }

        let tokens = devices::tokens_for_users(&self.pool, &request.user_ids).await?;
        let mut message = PushMessage::new(request.title, request.body);
        message.data = request.data;

        let mut totals = MulticastReport::default();
        let mut batches = 0;
        for chunk in tokens.chunks(BATCH_SIZE) {
            totals.merge(sender.send_multicast(chunk, &message).await);
            batches += 1;
        }

        let pruned = devices::delete_tokens(&self.pool, &totals.invalid_tokens).await?;
        metrics::record_push(totals.delivered, totals.failed, pruned as usize);
        info!(
            users = request.user_ids.len(),
            tokens = tokens.len(),
            delivered = totals.delivered,
            failed = totals.failed,
            pruned,
            "Push dispatched"
        );

        Ok(PushReport {
            batches,
            delivered: totals.delivered,
            failed: totals.failed,
            pruned_tokens: pruned,
        })
    }
}
