use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{MatchSource, MatchView};
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::repository::{likes, matches};
use crate::services::notifier::MatchNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    /// Both users like each other (now or from an earlier match)
    pub matched: bool,
}

pub struct LikeService {
    pool: PgPool,
    notifier: Arc<dyn MatchNotifier>,
}

impl LikeService {
    pub fn new(pool: PgPool, notifier: Arc<dyn MatchNotifier>) -> Self {
        Self { pool, notifier }
    }

    /// Like `target`; a reciprocal like turns into a match
    pub async fn like(&self, user_id: Uuid, target: Uuid) -> AppResult<LikeOutcome> {
        if user_id == target {
            return Err(AppError::BadRequest("cannot like yourself".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        if !likes::profile_exists(&mut *tx, target).await? {
            return Err(AppError::NotFound("profile not found".to_string()));
        }

        likes::lock_pair(&mut *tx, user_id, target).await?;
        likes::insert(&mut *tx, user_id, target).await?;
        let reciprocal = likes::exists(&mut *tx, target, user_id).await?;

        let created = if reciprocal {
            matches::insert(&mut *tx, user_id, target, MatchSource::Like, None).await?
        } else {
            false
        };
        tx.commit().await?;

        if created {
            metrics::record_match_created(MatchSource::Like.as_str());
            info!(user_id = %user_id, target = %target, "Mutual like created a match");

            let notifier = self.notifier.clone();
            tokio::spawn(async move {
                notifier.new_match([user_id, target], MatchSource::Like).await;
            });
        }

        Ok(LikeOutcome { matched: reciprocal })
    }

    pub async fn matches(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<MatchView>> {
        Ok(matches::list_for_user(&self.pool, user_id, limit, offset).await?)
    }
}
