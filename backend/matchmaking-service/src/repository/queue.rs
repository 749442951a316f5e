use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::{QueueEntry, QueueStatus};

#[derive(Debug, sqlx::FromRow)]
struct QueueRow {
    user_id: Uuid,
    status: String,
    session_id: Option<Uuid>,
    joined_at: DateTime<Utc>,
    last_heartbeat_at: DateTime<Utc>,
}

fn into_entry(row: QueueRow) -> Result<QueueEntry, sqlx::Error> {
    let status: QueueStatus = row
        .status
        .parse()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(QueueEntry {
        user_id: row.user_id,
        status,
        session_id: row.session_id,
        joined_at: row.joined_at,
        last_heartbeat_at: row.last_heartbeat_at,
    })
}

/// Put the user in the `searching` state. A user already searching keeps
/// their place in line.
pub async fn upsert_searching<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<QueueEntry, sqlx::Error> {
    let row = sqlx::query_as::<_, QueueRow>(
        r#"
        INSERT INTO random_call_queue (user_id, status, session_id, joined_at, last_heartbeat_at)
        VALUES ($1, 'searching', NULL, $2, $2)
        ON CONFLICT (user_id) DO UPDATE SET
            joined_at = CASE WHEN random_call_queue.status = 'searching'
                             THEN random_call_queue.joined_at
                             ELSE EXCLUDED.joined_at END,
            status = 'searching',
            session_id = NULL,
            last_heartbeat_at = EXCLUDED.last_heartbeat_at
        RETURNING user_id, status, session_id, joined_at, last_heartbeat_at
        "#,
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(executor)
    .await?;
    into_entry(row)
}

pub async fn find<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        "SELECT user_id, status, session_id, joined_at, last_heartbeat_at \
         FROM random_call_queue WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?
    .map(into_entry)
    .transpose()
}

pub async fn lock<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        "SELECT user_id, status, session_id, joined_at, last_heartbeat_at \
         FROM random_call_queue WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?
    .map(into_entry)
    .transpose()
}

pub async fn touch_heartbeat<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        r#"
        UPDATE random_call_queue SET last_heartbeat_at = $2
        WHERE user_id = $1
        RETURNING user_id, status, session_id, joined_at, last_heartbeat_at
        "#,
    )
    .bind(user_id)
    .bind(now)
    .fetch_optional(executor)
    .await?
    .map(into_entry)
    .transpose()
}

/// Oldest other searcher with a live heartbeat who has not been paired with
/// `user_id` since `cooldown_since`. Rows locked by a concurrent pairer are
/// skipped rather than waited on.
pub async fn pick_partner<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    heartbeat_cutoff: DateTime<Utc>,
    cooldown_since: DateTime<Utc>,
) -> Result<Option<QueueEntry>, sqlx::Error> {
    sqlx::query_as::<_, QueueRow>(
        r#"
        SELECT q.user_id, q.status, q.session_id, q.joined_at, q.last_heartbeat_at
        FROM random_call_queue q
        WHERE q.status = 'searching'
          AND q.user_id <> $1
          AND q.last_heartbeat_at >= $2
          AND NOT EXISTS (
              SELECT 1 FROM random_call_sessions s
              WHERE ((s.user_a = $1 AND s.user_b = q.user_id)
                  OR (s.user_a = q.user_id AND s.user_b = $1))
                AND s.created_at >= $3
          )
        ORDER BY q.joined_at ASC
        LIMIT 1
        FOR UPDATE OF q SKIP LOCKED
        "#,
    )
    .bind(user_id)
    .bind(heartbeat_cutoff)
    .bind(cooldown_since)
    .fetch_optional(executor)
    .await?
    .map(into_entry)
    .transpose()
}

pub async fn mark_matched<'e, E: PgExecutor<'e>>(
    executor: E,
    user_ids: &[Uuid],
    session_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE random_call_queue SET status = 'matched', session_id = $2 WHERE user_id = ANY($1)",
    )
    .bind(user_ids)
    .bind(session_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_searching<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM random_call_queue WHERE user_id = $1 AND status = 'searching'")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_for_session<'e, E: PgExecutor<'e>>(executor: E, session_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM random_call_queue WHERE session_id = $1")
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Drop searchers whose client stopped sending heartbeats
pub async fn delete_stale_searching<'e, E: PgExecutor<'e>>(
    executor: E,
    heartbeat_cutoff: DateTime<Utc>,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        DELETE FROM random_call_queue
        WHERE status = 'searching' AND last_heartbeat_at < $1
        RETURNING user_id
        "#,
    )
    .bind(heartbeat_cutoff)
    .fetch_all(executor)
    .await
}

/// Drop `matched` rows whose session is finished or gone
pub async fn delete_dangling_matched<'e, E: PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM random_call_queue q
        WHERE q.status = 'matched'
          AND NOT EXISTS (
              SELECT 1 FROM random_call_sessions s
              WHERE s.id = q.session_id AND s.status <> 'completed'
          )
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
