use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::Wallet;

/// Why a wallet balance changed; stored in `wallet_transactions.reason`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionReason {
    Purchase,
    JoinGift,
}

impl TransactionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionReason::Purchase => "purchase",
            TransactionReason::JoinGift => "join_gift",
        }
    }
}

pub async fn find<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<Option<Wallet>, sqlx::Error> {
    sqlx::query_as::<_, Wallet>(
        "SELECT user_id, coin_balance, updated_at FROM wallets WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

async fn record_transaction(
    conn: &mut PgConnection,
    user_id: Uuid,
    delta: i64,
    reason: TransactionReason,
    reference: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO wallet_transactions (id, user_id, delta, reason, reference)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(delta)
    .bind(reason.as_str())
    .bind(reference)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add coins, creating the wallet on first credit. Returns the new balance.
pub async fn credit(
    conn: &mut PgConnection,
    user_id: Uuid,
    amount: i64,
    reason: TransactionReason,
    reference: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let balance: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO wallets (user_id, coin_balance, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            coin_balance = wallets.coin_balance + EXCLUDED.coin_balance,
            updated_at = NOW()
        RETURNING coin_balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await?;

    record_transaction(conn, user_id, amount, reason, reference).await?;
    Ok(balance)
}

/// Take `amount` coins if the balance covers it. Returns the new balance, or
/// `None` when the wallet is missing or short.
pub async fn debit(
    conn: &mut PgConnection,
    user_id: Uuid,
    amount: i64,
    reason: TransactionReason,
    reference: Option<&str>,
) -> Result<Option<i64>, sqlx::Error> {
    let balance: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE wallets
        SET coin_balance = coin_balance - $2, updated_at = NOW()
        WHERE user_id = $1 AND coin_balance >= $2
        RETURNING coin_balance
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await?;

    if balance.is_some() {
        record_transaction(conn, user_id, -amount, reason, reference).await?;
    }
    Ok(balance)
}
