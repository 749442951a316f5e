//! Change feed for clients subscribed to random-call updates.
//!
//! Events are published with `pg_notify` inside the writing transaction, so
//! listeners only ever see committed state.

use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::{CallSession, QueueStatus};

pub const CHANNEL: &str = "random_call_events";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RandomCallEvent {
    QueueUpdated {
        user_id: Uuid,
        status: Option<QueueStatus>,
        session_id: Option<Uuid>,
    },
    SessionUpdated {
        session_id: Uuid,
        user_ids: [Uuid; 2],
        status: &'static str,
        round: i32,
        outcome: Option<&'static str>,
    },
}

impl RandomCallEvent {
    pub fn session(session: &CallSession) -> Self {
        RandomCallEvent::SessionUpdated {
            session_id: session.id,
            user_ids: [session.user_a, session.user_b],
            status: session.status.as_str(),
            round: session.round,
            outcome: session.outcome.map(|o| o.as_str()),
        }
    }
}

pub async fn notify<'e, E: PgExecutor<'e>>(executor: E, event: &RandomCallEvent) -> Result<(), sqlx::Error> {
    let payload = serde_json::to_string(event).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(CHANNEL)
        .bind(payload)
        .execute(executor)
        .await?;
    Ok(())
}
