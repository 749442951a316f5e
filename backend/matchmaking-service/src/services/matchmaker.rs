//! Random-call queue and pairing
//!
//! Pairing runs in one transaction: the caller's queue row is locked first,
//! then the partner row is taken with `SKIP LOCKED`. A pairer therefore only
//! ever waits on its own row, and whoever holds that row never waits on
//! anything else, so concurrent pairers cannot deadlock or pick the same
//! partner twice.
//!
//! `join` locks the caller's queue row before its final open-session check,
//! so it cannot reset a row that a concurrent pairer has just matched.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{CallPolicy, CallSession, QueueState, QueueStatus, ReaperPolicy};
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::repository::{events, queue, sessions};
use crate::services::sessions::persist;

pub struct Matchmaker {
    pool: PgPool,
    policy: CallPolicy,
    reaper_policy: ReaperPolicy,
}

impl Matchmaker {
    pub fn new(pool: PgPool, policy: CallPolicy, reaper_policy: ReaperPolicy) -> Self {
        Self {
            pool,
            policy,
            reaper_policy,
        }
    }

    /// The user's open session after applying its deadlines, if it is still
    /// open. Keeps a session that silently timed out from blocking a new join.
    async fn settle_open_session(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let Some(open) = sessions::find_open_for_user(&mut *conn, user_id).await? else {
            return Ok(None);
        };
        let Some(mut session) = sessions::lock(&mut *conn, open.id).await? else {
            return Ok(None);
        };

        let was_terminal = session.is_terminal();
        if session.advance(now, &self.policy) {
            persist(&mut *conn, &session, was_terminal).await?;
        }

        Ok((!session.is_terminal()).then_some(session))
    }

    /// Enter the queue and try to pair right away
    pub async fn join(&self, user_id: Uuid) -> AppResult<QueueState> {
        let now = Utc::now();

        // deadlines first, taking the session lock before any queue row
        let mut tx = self.pool.begin().await?;
        let settled = self.settle_open_session(&mut *tx, user_id, now).await?;
        tx.commit().await?;
        if let Some(session) = settled {
            return Err(AppError::AlreadyInSession {
                session_id: session.id,
            });
        }

        let mut tx = self.pool.begin().await?;

        // waits out a pairer that holds this row, so a session it just
        // committed is visible to the check below
        queue::lock(&mut *tx, user_id).await?;
        if let Some(session) = sessions::find_open_for_user(&mut *tx, user_id).await? {
            tx.commit().await?;
            return Err(AppError::AlreadyInSession {
                session_id: session.id,
            });
        }

        let entry = queue::upsert_searching(&mut *tx, user_id, now).await?;
        events::notify(
            &mut *tx,
            &events::RandomCallEvent::QueueUpdated {
                user_id,
                status: Some(entry.status),
                session_id: None,
            },
        )
        .await?;
        tx.commit().await?;

        metrics::record_queue_event("join");
        debug!(user_id = %user_id, "Joined random-call queue");

        self.try_pair(user_id).await
    }

    /// Keep the queue row alive; pairs when still searching
    pub async fn heartbeat(&self, user_id: Uuid) -> AppResult<QueueState> {
        let entry = queue::touch_heartbeat(&self.pool, user_id, Utc::now())
            .await?
            .ok_or(AppError::NotInQueue)?;

        match entry.status {
            QueueStatus::Searching => self.try_pair(user_id).await,
            QueueStatus::Matched => Ok(QueueState::from(Some(entry))),
        }
    }

    pub async fn status(&self, user_id: Uuid) -> AppResult<QueueState> {
        match queue::find(&self.pool, user_id).await? {
            Some(entry) if entry.status == QueueStatus::Searching => self.try_pair(user_id).await,
            other => Ok(QueueState::from(other)),
        }
    }

    /// Leave the queue. A row already paired into a session is left for the
    /// session lifecycle to clean up.
    pub async fn leave(&self, user_id: Uuid) -> AppResult<QueueState> {
        let mut tx = self.pool.begin().await?;
        if queue::delete_searching(&mut *tx, user_id).await? {
            events::notify(
                &mut *tx,
                &events::RandomCallEvent::QueueUpdated {
                    user_id,
                    status: None,
                    session_id: None,
                },
            )
            .await?;
            metrics::record_queue_event("leave");
        }
        let remaining = queue::find(&mut *tx, user_id).await?;
        tx.commit().await?;

        Ok(QueueState::from(remaining))
    }

    /// Pair `user_id` with the longest-waiting eligible searcher
    pub async fn try_pair(&self, user_id: Uuid) -> AppResult<QueueState> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let Some(entry) = queue::lock(&mut *tx, user_id).await? else {
            tx.commit().await?;
            return Ok(QueueState::Idle);
        };
        if entry.status != QueueStatus::Searching {
            tx.commit().await?;
            return Ok(QueueState::from(Some(entry)));
        }

        let partner = queue::pick_partner(
            &mut *tx,
            user_id,
            now - self.reaper_policy.heartbeat_timeout,
            now - self.policy.rematch_cooldown,
        )
        .await?;

        let Some(partner) = partner else {
            tx.commit().await?;
            return Ok(QueueState::Searching {
                joined_at: entry.joined_at,
            });
        };

        let (first, second) = if partner.joined_at <= entry.joined_at {
            (partner.user_id, user_id)
        } else {
            (user_id, partner.user_id)
        };
        let session = CallSession::pair(first, second, now);

        sessions::insert(&mut *tx, &session).await?;
        queue::mark_matched(&mut *tx, &[first, second], session.id).await?;
        events::notify(&mut *tx, &events::RandomCallEvent::session(&session)).await?;
        for user in [first, second] {
            events::notify(
                &mut *tx,
                &events::RandomCallEvent::QueueUpdated {
                    user_id: user,
                    status: Some(QueueStatus::Matched),
                    session_id: Some(session.id),
                },
            )
            .await?;
        }
        tx.commit().await?;

        metrics::record_queue_event("paired");
        info!(session_id = %session.id, "Paired two random-call users");

        Ok(QueueState::Matched {
            session_id: session.id,
        })
    }
}
