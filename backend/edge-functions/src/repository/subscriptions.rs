use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Subscription;

const COLUMNS: &str = "user_id, product_key, status, provider_customer_id, provider_subscription_id, \
                       current_period_end, cancel_at_period_end, updated_at";

pub async fn find_for_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {} FROM subscriptions WHERE user_id = $1",
        COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Record the subscription a completed checkout created
pub async fn activate<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    product_key: &str,
    customer_id: Option<&str>,
    subscription_id: Option<&str>,
) -> Result<Subscription, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        r#"
        INSERT INTO subscriptions
            (user_id, product_key, status, provider_customer_id, provider_subscription_id, updated_at)
        VALUES ($1, $2, 'active', $3, $4, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            product_key = EXCLUDED.product_key,
            status = 'active',
            provider_customer_id = COALESCE(EXCLUDED.provider_customer_id, subscriptions.provider_customer_id),
            provider_subscription_id = COALESCE(EXCLUDED.provider_subscription_id, subscriptions.provider_subscription_id),
            cancel_at_period_end = FALSE,
            updated_at = NOW()
        RETURNING {}
        "#,
        COLUMNS
    ))
    .bind(user_id)
    .bind(product_key)
    .bind(customer_id)
    .bind(subscription_id)
    .fetch_one(executor)
    .await
}

/// Mirror the gateway's view of a subscription. Returns false when we have
/// no row for that provider id.
pub async fn sync_from_provider<'e, E: PgExecutor<'e>>(
    executor: E,
    provider_subscription_id: &str,
    status: &str,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE subscriptions
        SET status = $2,
            current_period_end = COALESCE($3, current_period_end),
            cancel_at_period_end = $4,
            updated_at = NOW()
        WHERE provider_subscription_id = $1
        "#,
    )
    .bind(provider_subscription_id)
    .bind(status)
    .bind(current_period_end)
    .bind(cancel_at_period_end)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
