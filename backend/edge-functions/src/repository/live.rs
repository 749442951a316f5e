use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Gift, LiveStream, StreamStatus};

#[derive(Debug, sqlx::FromRow)]
struct StreamRow {
    id: Uuid,
    host_id: Uuid,
    title: String,
    join_gift_id: Option<Uuid>,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl TryFrom<StreamRow> for LiveStream {
    type Error = sqlx::Error;

    fn try_from(row: StreamRow) -> Result<Self, Self::Error> {
        let status: StreamStatus = row
            .status
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(LiveStream {
            id: row.id,
            host_id: row.host_id,
            title: row.title,
            join_gift_id: row.join_gift_id,
            status,
            started_at: row.started_at,
            ended_at: row.ended_at,
        })
    }
}

const STREAM_COLUMNS: &str = "id, host_id, title, join_gift_id, status, started_at, ended_at";

pub async fn insert_stream<'e, E: PgExecutor<'e>>(
    executor: E,
    host_id: Uuid,
    title: &str,
    join_gift_id: Option<Uuid>,
) -> Result<LiveStream, sqlx::Error> {
    let row = sqlx::query_as::<_, StreamRow>(&format!(
        r#"
        INSERT INTO live_streams (id, host_id, title, join_gift_id, status)
        VALUES ($1, $2, $3, $4, 'live')
        RETURNING {}
        "#,
        STREAM_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(host_id)
    .bind(title)
    .bind(join_gift_id)
    .fetch_one(executor)
    .await?;
    row.try_into()
}

pub async fn find_stream<'e, E: PgExecutor<'e>>(
    executor: E,
    stream_id: Uuid,
) -> Result<Option<LiveStream>, sqlx::Error> {
    sqlx::query_as::<_, StreamRow>(&format!(
        "SELECT {} FROM live_streams WHERE id = $1",
        STREAM_COLUMNS
    ))
    .bind(stream_id)
    .fetch_optional(executor)
    .await?
    .map(LiveStream::try_from)
    .transpose()
}

pub async fn host_has_live_stream<'e, E: PgExecutor<'e>>(executor: E, host_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM live_streams WHERE host_id = $1 AND status = 'live')",
    )
    .bind(host_id)
    .fetch_one(executor)
    .await
}

/// End a live stream owned by `host_id`. `None` when no such live stream.
pub async fn end_stream<'e, E: PgExecutor<'e>>(
    executor: E,
    stream_id: Uuid,
    host_id: Uuid,
) -> Result<Option<LiveStream>, sqlx::Error> {
    sqlx::query_as::<_, StreamRow>(&format!(
        r#"
        UPDATE live_streams SET status = 'ended', ended_at = NOW()
        WHERE id = $1 AND host_id = $2 AND status = 'live'
        RETURNING {}
        "#,
        STREAM_COLUMNS
    ))
    .bind(stream_id)
    .bind(host_id)
    .fetch_optional(executor)
    .await?
    .map(LiveStream::try_from)
    .transpose()
}

pub async fn find_gift<'e, E: PgExecutor<'e>>(executor: E, gift_id: Uuid) -> Result<Option<Gift>, sqlx::Error> {
    sqlx::query_as::<_, Gift>("SELECT id, name, coin_price, active FROM gifts WHERE id = $1")
        .bind(gift_id)
        .fetch_optional(executor)
        .await
}

pub async fn has_grant<'e, E: PgExecutor<'e>>(
    executor: E,
    stream_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM live_access_grants WHERE stream_id = $1 AND user_id = $2)",
    )
    .bind(stream_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// Returns false when the viewer already had access
pub async fn insert_grant<'e, E: PgExecutor<'e>>(
    executor: E,
    stream_id: Uuid,
    user_id: Uuid,
    gift_id: Uuid,
    coins_paid: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO live_access_grants (stream_id, user_id, gift_id, coins_paid)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (stream_id, user_id) DO NOTHING
        "#,
    )
    .bind(stream_id)
    .bind(user_id)
    .bind(gift_id)
    .bind(coins_paid)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
