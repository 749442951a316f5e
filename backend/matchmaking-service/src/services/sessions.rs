use chrono::{DateTime, Utc};
use serde::Serialize;
use sfu_token::{SfuCredentials, VideoGrant};
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    CallPolicy, CallSession, Decision, MatchSource, SessionError, SessionStatus, SessionView, Side,
};
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::repository::{events, matches, queue, sessions};
use crate::services::notifier::MatchNotifier;

pub fn room_name(session_id: Uuid) -> String {
    format!("random-call-{}", session_id)
}

/// Write a changed session back inside the caller's transaction.
///
/// Publishes the change and, when this write completes the session, removes
/// both queue rows and records a mutual match. Returns true when a new match
/// row was created.
pub(crate) async fn persist(
    conn: &mut PgConnection,
    session: &CallSession,
    was_terminal: bool,
) -> Result<bool, sqlx::Error> {
    sessions::save(&mut *conn, session).await?;
    events::notify(&mut *conn, &events::RandomCallEvent::session(session)).await?;

    if was_terminal || !session.is_terminal() {
        return Ok(false);
    }

    queue::delete_for_session(&mut *conn, session.id).await?;
    if let Some(reason) = session.end_reason {
        metrics::record_session_completed(reason);
    }

    if !session.is_mutual_match() {
        return Ok(false);
    }

    let created = matches::insert(
        &mut *conn,
        session.user_a,
        session.user_b,
        MatchSource::RandomCall,
        Some(session.id),
    )
    .await?;
    if created {
        metrics::record_match_created(MatchSource::RandomCall.as_str());
    }
    Ok(created)
}

/// SFU access for one participant of a call
#[derive(Debug, Serialize)]
pub struct RoomAccess {
    pub token: String,
    pub url: String,
    pub room: String,
    pub identity: &'static str,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionService {
    pool: PgPool,
    policy: CallPolicy,
    sfu: SfuCredentials,
    notifier: Arc<dyn MatchNotifier>,
}

impl SessionService {
    pub fn new(
        pool: PgPool,
        policy: CallPolicy,
        sfu: SfuCredentials,
        notifier: Arc<dyn MatchNotifier>,
    ) -> Self {
        Self {
            pool,
            policy,
            sfu,
            notifier,
        }
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    /// Lock the session, apply pending deadlines, run `op` for the caller's
    /// side and persist whatever changed.
    ///
    /// Deadline changes are committed even when `op` is rejected, so the
    /// error the client sees matches the state it reads next.
    async fn apply<F>(&self, session_id: Uuid, user_id: Uuid, op: F) -> AppResult<(CallSession, Side)>
    where
        F: FnOnce(&mut CallSession, Side, DateTime<Utc>, &CallPolicy) -> Result<bool, SessionError>,
    {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut session = sessions::lock(&mut *tx, session_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;
        let side = session.side_of(user_id)?;
        let was_terminal = session.is_terminal();

        let advanced = session.advance(now, &self.policy);
        let result = op(&mut session, side, now, &self.policy);
        let changed = advanced || matches!(result, Ok(true));

        let new_match = if changed {
            persist(&mut *tx, &session, was_terminal).await?
        } else {
            false
        };
        tx.commit().await?;

        result?;

        if changed && session.is_terminal() && !was_terminal {
            info!(
                session_id = %session.id,
                outcome = ?session.outcome,
                end_reason = ?session.end_reason,
                round = session.round,
                "Random-call session completed"
            );
        }
        if new_match {
            self.announce_match(&session);
        }

        Ok((session, side))
    }

    fn announce_match(&self, session: &CallSession) {
        let notifier = self.notifier.clone();
        let users = [session.user_a, session.user_b];
        tokio::spawn(async move {
            notifier.new_match(users, MatchSource::RandomCall).await;
        });
    }

    async fn render(&self, session: &CallSession, side: Side) -> AppResult<SessionView> {
        let partner_profile = if session.is_mutual_match() {
            matches::profile_summary(&self.pool, session.user(side.other())).await?
        } else {
            None
        };
        Ok(session.view_for(side, &self.policy, partner_profile))
    }

    async fn apply_and_render<F>(&self, session_id: Uuid, user_id: Uuid, op: F) -> AppResult<SessionView>
    where
        F: FnOnce(&mut CallSession, Side, DateTime<Utc>, &CallPolicy) -> Result<bool, SessionError>,
    {
        let (session, side) = self.apply(session_id, user_id, op).await?;
        self.render(&session, side).await
    }

    /// The caller's open session
    pub async fn current(&self, user_id: Uuid) -> AppResult<SessionView> {
        let open = sessions::find_open_for_user(&self.pool, user_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;
        let view = self.get(open.id, user_id).await?;
        // the lazy advance may have just closed it
        if view.status.is_terminal() {
            return Err(AppError::SessionNotFound);
        }
        Ok(view)
    }

    pub async fn get(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionView> {
        self.apply_and_render(session_id, user_id, |_, _, _, _| Ok(false))
            .await
    }

    /// The caller is connected to the room
    pub async fn join(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionView> {
        self.apply_and_render(session_id, user_id, |s, side, now, policy| {
            s.mark_joined(side, now, policy)
        })
        .await
    }

    pub async fn end_call(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionView> {
        self.apply_and_render(session_id, user_id, |s, _, now, policy| {
            s.end_call_phase(now, policy)
        })
        .await
    }

    pub async fn decide(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        decision: Decision,
    ) -> AppResult<SessionView> {
        self.apply_and_render(session_id, user_id, |s, side, now, policy| {
            s.submit_decision(side, decision, now, policy)
        })
        .await
    }

    pub async fn leave(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SessionView> {
        self.apply_and_render(session_id, user_id, |s, side, now, _| Ok(s.leave(side, now)))
            .await
    }

    /// Voice-only room token under the caller's anonymous alias, valid until
    /// the current call phase and its decision window are over
    pub async fn room_token(&self, session_id: Uuid, user_id: Uuid) -> AppResult<RoomAccess> {
        let (session, side) = self
            .apply(session_id, user_id, |_, _, _, _| Ok(false))
            .await?;

        if !matches!(session.status, SessionStatus::Matched | SessionStatus::Active) {
            return Err(SessionError::InvalidState {
                expected: "matched or active",
                actual: session.status,
            }
            .into());
        }

        let now = Utc::now();
        let expires_at = session
            .room_deadline(&self.policy)
            .ok_or_else(|| AppError::Internal("open session without room deadline".to_string()))?;
        let room = room_name(session.id);

        let token = self
            .sfu
            .token()
            .identity(side.alias())
            .name(side.alias())
            .grant(VideoGrant::voice(room.clone()))
            .expires_at(expires_at, now)
            .to_jwt_at(now)?;

        Ok(RoomAccess {
            token,
            url: self.sfu.url.clone(),
            room,
            identity: side.alias(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name() {
        let id = Uuid::nil();
        assert_eq!(
            room_name(id),
            "random-call-00000000-0000-0000-0000-000000000000"
        );
    }
}
