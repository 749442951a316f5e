use sqlx::PgExecutor;
use uuid::Uuid;

/// Record that `liker` likes `likee`; false if it was already recorded
pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, liker: Uuid, likee: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO likes (liker_id, likee_id)
        VALUES ($1, $2)
        ON CONFLICT (liker_id, likee_id) DO NOTHING
        "#,
    )
    .bind(liker)
    .bind(likee)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists<'e, E: PgExecutor<'e>>(executor: E, liker: Uuid, likee: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE liker_id = $1 AND likee_id = $2)",
    )
    .bind(liker)
    .bind(likee)
    .fetch_one(executor)
    .await
}

/// Serialize likes between the same two users for the rest of the transaction,
/// so two people liking each other at the same moment still produce a match.
pub async fn lock_pair<'e, E: PgExecutor<'e>>(executor: E, a: Uuid, b: Uuid) -> Result<(), sqlx::Error> {
    let (low, high) = super::matches::ordered_pair(a, b);
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("likes:{}:{}", low, high))
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn profile_exists<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
        .bind(user_id)
        .fetch_one(executor)
        .await
}
