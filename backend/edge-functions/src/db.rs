use db_pool::{create_pool, DbConfig};
use sqlx::migrate::Migrator;
use sqlx::PgPool;

/// Shared with matchmaking-service; whichever starts first applies it
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

pub async fn init_pool(config: DbConfig) -> anyhow::Result<PgPool> {
    tracing::info!(?config, "Connecting to database");
    let pool = create_pool(config).await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
