//! Shared helpers for matchmaking-service integration tests

#![allow(dead_code)]

use chrono::{Duration, Utc};
use db_pool::DbConfig;
use jsonwebtoken::{encode, EncodingKey, Header};
use matchmaking_service::config::{
    AppConfig, AuthConfig, Config, PushConfig, ReaperConfig,
};
use matchmaking_service::db::MIGRATOR;
use matchmaking_service::domain::{CallPolicy, ReaperPolicy};
use serde::Serialize;
use sfu_token::SfuCredentials;
use sqlx::PgPool;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN_TOKEN: &str = "integration-admin-token";

pub fn test_config(database_url: &str) -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            http_port: 0,
            admin_token: Some(ADMIN_TOKEN.to_string()),
        },
        database: DbConfig {
            service_name: "matchmaking-service-test".to_string(),
            database_url: database_url.to_string(),
            max_connections: 5,
            min_connections: 0,
            ..DbConfig::default()
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_audience: None,
        },
        call: CallPolicy::default(),
        reaper: ReaperConfig {
            enabled: false,
            interval: std::time::Duration::from_secs(60),
            policy: ReaperPolicy::default(),
        },
        sfu: SfuCredentials {
            url: "wss://sfu.test".to_string(),
            api_key: "test-key".to_string(),
            api_secret: "test-secret-test-secret-test-secret".to_string(),
        },
        push: PushConfig { dispatch_url: None },
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: usize,
}

/// A valid `Authorization` header value for `user_id`
pub fn bearer(user_id: Uuid) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

/// Pool that never connects unless a query runs
pub fn lazy_pool() -> PgPool {
    test_config("postgres://127.0.0.1:1/unused")
        .database
        .connect_lazy()
        .unwrap()
}

/// Connect to `DATABASE_URL`, migrate and wipe every table the service uses
pub async fn db_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPool::connect(&url).await.expect("connect to test database");
    MIGRATOR.run(&pool).await.expect("run migrations");
    sqlx::query(
        "TRUNCATE random_call_queue, random_call_sessions, matches, likes, profiles CASCADE",
    )
    .execute(&pool)
    .await
    .expect("truncate tables");
    pool
}

pub async fn create_profile(pool: &PgPool, display_name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, display_name) VALUES ($1, $2)")
        .bind(id)
        .bind(display_name)
        .execute(pool)
        .await
        .expect("insert profile");
    id
}
