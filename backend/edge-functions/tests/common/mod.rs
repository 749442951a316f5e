//! Shared helpers for edge-functions integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use db_pool::DbConfig;
use edge_functions::config::{
    AppConfig, AuthConfig, Config, EmailConfig, PaymentsConfig, PushConfig, RedisConfig,
};
use edge_functions::db::MIGRATOR;
use edge_functions::models::ProductCatalog;
use edge_functions::services::{CheckoutGateway, CheckoutRequest, CheckoutSession, GatewayError};
use fcm_shared::{FcmError, PushMessage, PushSender, SendOutcome};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use sfu_token::SfuCredentials;
use sqlx::PgPool;
use std::sync::Mutex;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN_TOKEN: &str = "integration-admin-token";
pub const WEBHOOK_SECRET: &str = "whsec_integration";

pub fn test_config(database_url: &str) -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            http_port: 0,
            admin_token: Some(ADMIN_TOKEN.to_string()),
        },
        database: DbConfig {
            service_name: "edge-functions-test".to_string(),
            database_url: database_url.to_string(),
            max_connections: 5,
            min_connections: 0,
            ..DbConfig::default()
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_audience: None,
        },
        payments: PaymentsConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            secret_key: None,
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            success_url: "lumo://ok".to_string(),
            cancel_url: "lumo://cancel".to_string(),
            webhook_tolerance_secs: 300,
            products: ProductCatalog::parse(
                "premium:price_premium:subscription,coins_100:price_c100:coins:100",
            )
            .unwrap(),
        },
        push: PushConfig {
            service_account_json: None,
        },
        email: EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            use_starttls: true,
            from: "Lumo <no-reply@lumo.test>".to_string(),
            support_inbox: "support@lumo.test".to_string(),
            max_requests_per_hour: 5,
        },
        redis: RedisConfig { url: None },
        sfu: SfuCredentials {
            url: "wss://sfu.test".to_string(),
            api_key: "test-key".to_string(),
            api_secret: "test-secret-test-secret-test-secret".to_string(),
        },
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: usize,
}

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

pub fn lazy_pool() -> PgPool {
    test_config("postgres://127.0.0.1:1/unused")
        .database
        .connect_lazy()
        .unwrap()
}

pub async fn db_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPool::connect(&url).await.expect("connect to test database");
    MIGRATOR.run(&pool).await.expect("run migrations");
    sqlx::query(
        r#"
        TRUNCATE live_access_grants, live_streams, gifts, support_tickets, device_tokens,
                 payment_events, subscriptions, wallet_transactions, wallets, profiles CASCADE
        "#,
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

pub async fn create_gift(pool: &PgPool, name: &str, coin_price: i64) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO gifts (id, name, coin_price) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(coin_price)
        .execute(pool)
        .await
        .expect("insert gift");
    id
}

/// Gateway double that hands out predictable sessions
pub struct FakeGateway;

#[async_trait]
impl CheckoutGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            id: format!("cs_test_{}", request.product.key),
            url: format!("https://checkout.test/{}", request.product.price_id),
        })
    }
}

/// Push double: tokens starting with `dead-` are reported unregistered
#[derive(Default)]
pub struct FakePush {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl PushSender for FakePush {
    async fn send(&self, device_token: &str, _message: &PushMessage) -> Result<SendOutcome, FcmError> {
        self.sent.lock().unwrap().push(device_token.to_string());
        if device_token.starts_with("dead-") {
            Ok(SendOutcome::InvalidToken)
        } else {
            Ok(SendOutcome::Delivered {
                message_id: format!("projects/test/messages/{}", device_token),
            })
        }
    }
}
