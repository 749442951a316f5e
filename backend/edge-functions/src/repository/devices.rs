use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Platform;

/// Register a device token. A token moves to whichever user registered it last.
pub async fn upsert<'e, E: PgExecutor<'e>>(
    executor: E,
    token: &str,
    user_id: Uuid,
    platform: Platform,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO device_tokens (token, user_id, platform)
        VALUES ($1, $2, $3)
        ON CONFLICT (token) DO UPDATE SET
            user_id = EXCLUDED.user_id,
            platform = EXCLUDED.platform,
            updated_at = NOW()
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(platform.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    token: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM device_tokens WHERE token = $1 AND user_id = $2")
        .bind(token)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn tokens_for_users<'e, E: PgExecutor<'e>>(
    executor: E,
    user_ids: &[Uuid],
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT token FROM device_tokens WHERE user_id = ANY($1) ORDER BY updated_at DESC")
        .bind(user_ids)
        .fetch_all(executor)
        .await
}

/// Drop tokens the push provider reported as unregistered
pub async fn delete_tokens<'e, E: PgExecutor<'e>>(executor: E, tokens: &[String]) -> Result<u64, sqlx::Error> {
    if tokens.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query("DELETE FROM device_tokens WHERE token = ANY($1)")
        .bind(tokens)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
