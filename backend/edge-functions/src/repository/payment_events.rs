use sqlx::PgExecutor;

/// Remember a gateway event id. Returns false when it was already seen.
pub async fn record<'e, E: PgExecutor<'e>>(
    executor: E,
    event_id: &str,
    event_type: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO payment_events (id, event_type) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
