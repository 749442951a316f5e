use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::{CallSession, UnknownVariant};

const SELECT_SESSION: &str = "SELECT id, user_a, user_b, status, outcome, end_reason, round, \
     user_a_joined, user_b_joined, user_a_decision, user_b_decision, created_at, updated_at, \
     started_at, ends_at, deciding_started_at, decision_deadline, completed_at \
     FROM random_call_sessions";

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
    status: String,
    outcome: Option<String>,
    end_reason: Option<String>,
    round: i32,
    user_a_joined: bool,
    user_b_joined: bool,
    user_a_decision: Option<String>,
    user_b_decision: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    deciding_started_at: Option<DateTime<Utc>>,
    decision_deadline: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

fn parse_opt<T: std::str::FromStr<Err = UnknownVariant>>(
    value: Option<String>,
) -> Result<Option<T>, UnknownVariant> {
    value.map(|v| v.parse()).transpose()
}

impl TryFrom<SessionRow> for CallSession {
    type Error = UnknownVariant;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(CallSession {
            id: row.id,
            user_a: row.user_a,
            user_b: row.user_b,
            status: row.status.parse()?,
            outcome: parse_opt(row.outcome)?,
            end_reason: parse_opt(row.end_reason)?,
            round: row.round,
            user_a_joined: row.user_a_joined,
            user_b_joined: row.user_b_joined,
            user_a_decision: parse_opt(row.user_a_decision)?,
            user_b_decision: parse_opt(row.user_b_decision)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            started_at: row.started_at,
            ends_at: row.ends_at,
            deciding_started_at: row.deciding_started_at,
            decision_deadline: row.decision_deadline,
            completed_at: row.completed_at,
        })
    }
}

fn into_session(row: SessionRow) -> Result<CallSession, sqlx::Error> {
    CallSession::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

async fn fetch_one_where<'e, E: PgExecutor<'e>>(
    executor: E,
    clause: &str,
    id: Uuid,
) -> Result<Option<CallSession>, sqlx::Error> {
    let sql = format!("{} {}", SELECT_SESSION, clause);
    sqlx::query_as::<_, SessionRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(into_session)
        .transpose()
}

pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, s: &CallSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO random_call_sessions (id, user_a, user_b, status, round, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(s.id)
    .bind(s.user_a)
    .bind(s.user_b)
    .bind(s.status.as_str())
    .bind(s.round)
    .bind(s.created_at)
    .bind(s.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Write back every mutable column of `s`
pub async fn save<'e, E: PgExecutor<'e>>(executor: E, s: &CallSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE random_call_sessions SET
            status = $2,
            outcome = $3,
            end_reason = $4,
            round = $5,
            user_a_joined = $6,
            user_b_joined = $7,
            user_a_decision = $8,
            user_b_decision = $9,
            updated_at = $10,
            started_at = $11,
            ends_at = $12,
            deciding_started_at = $13,
            decision_deadline = $14,
            completed_at = $15
        WHERE id = $1
        "#,
    )
    .bind(s.id)
    .bind(s.status.as_str())
    .bind(s.outcome.map(|o| o.as_str()))
    .bind(s.end_reason.map(|r| r.as_str()))
    .bind(s.round)
    .bind(s.user_a_joined)
    .bind(s.user_b_joined)
    .bind(s.user_a_decision.map(|d| d.as_str()))
    .bind(s.user_b_decision.map(|d| d.as_str()))
    .bind(s.updated_at)
    .bind(s.started_at)
    .bind(s.ends_at)
    .bind(s.deciding_started_at)
    .bind(s.decision_deadline)
    .bind(s.completed_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<CallSession>, sqlx::Error> {
    fetch_one_where(executor, "WHERE id = $1", id).await
}

/// Row-locked read; the lock is held until the surrounding transaction ends
pub async fn lock<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<CallSession>, sqlx::Error> {
    fetch_one_where(executor, "WHERE id = $1 FOR UPDATE", id).await
}

/// The user's non-terminal session, if any
pub async fn find_open_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<CallSession>, sqlx::Error> {
    fetch_one_where(
        executor,
        "WHERE (user_a = $1 OR user_b = $1) AND status <> 'completed' \
         ORDER BY created_at DESC LIMIT 1",
        user_id,
    )
    .await
}

/// Ids of every non-terminal session, oldest activity first
pub async fn open_session_ids<'e, E: PgExecutor<'e>>(executor: E, limit: i64) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT id FROM random_call_sessions
        WHERE status <> 'completed'
        ORDER BY updated_at ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}
