//! Prometheus gauges for the database connection pool

use once_cell::sync::Lazy;
use prometheus::{register_int_gauge_vec, IntGaugeVec};
use sqlx::PgPool;

/// Connection count by state (idle/active/max)
static DB_POOL_CONNECTIONS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    )
    .expect("Prometheus metrics registration should succeed at startup")
});

/// Refresh the pool gauges for `service`
pub fn update_pool_metrics(pool: &PgPool, service: &str) {
    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "idle"])
        .set(idle);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "active"])
        .set(size - idle);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "max"])
        .set(pool.options().get_max_connections() as i64);
}

/// Fraction of the pool currently checked out (0.0 - 1.0)
pub fn pool_utilization(pool: &PgPool) -> f64 {
    let max = pool.options().get_max_connections();
    if max == 0 {
        return 0.0;
    }
    let active = pool.size().saturating_sub(pool.num_idle() as u32);
    active as f64 / max as f64
}
