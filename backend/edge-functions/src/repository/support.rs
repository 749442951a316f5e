use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    subject: &str,
    message: &str,
    contact_email: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO support_tickets (id, user_id, subject, message, contact_email)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(subject)
    .bind(message)
    .bind(contact_email)
    .execute(executor)
    .await?;
    Ok(id)
}

pub async fn mark_emailed<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE support_tickets SET emailed_at = $2 WHERE id = $1")
        .bind(ticket_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}
