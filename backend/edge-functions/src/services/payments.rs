//! Checkout creation and payment webhook ingestion
//!
//! A webhook is applied in one transaction together with its `payment_events`
//! row. A redelivered event finds that row and does nothing; a failed
//! application rolls the row back so the gateway's retry gets another try.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PaymentsConfig;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{ProductKind, Subscription, Wallet};
use crate::repository::{payment_events, subscriptions, wallets};
use crate::repository::wallets::TransactionReason;
use crate::services::gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::services::signature;

#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: GatewayEventData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CompletedCheckout {
    id: String,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    subscription: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct GatewaySubscription {
    id: String,
    status: String,
    #[serde(default)]
    current_period_end: Option<i64>,
    #[serde(default)]
    cancel_at_period_end: bool,
}

/// What happened to one webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Ignored,
}

impl WebhookOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Processed => "processed",
            WebhookOutcome::Duplicate => "duplicate",
            WebhookOutcome::Ignored => "ignored",
        }
    }
}

pub struct PaymentsService {
    pool: PgPool,
    gateway: Option<Arc<dyn CheckoutGateway>>,
    config: PaymentsConfig,
}

impl PaymentsService {
    pub fn new(pool: PgPool, gateway: Option<Arc<dyn CheckoutGateway>>, config: PaymentsConfig) -> Self {
        Self {
            pool,
            gateway,
            config,
        }
    }

    pub async fn create_checkout(&self, user_id: Uuid, product_key: &str) -> AppResult<CheckoutSession> {
        let product = self
            .config
            .products
            .get(product_key)
            .ok_or_else(|| AppError::UnknownProduct(product_key.to_string()))?;
        let gateway = self
            .gateway
            .as_ref()
            .ok_or_else(|| AppError::ServiceUnavailable("payments are not configured".to_string()))?;

        let request = CheckoutRequest {
            user_id,
            product,
            success_url: &self.config.success_url,
            cancel_url: &self.config.cancel_url,
        };

        match gateway.create_checkout_session(&request).await {
            Ok(session) => {
                metrics::record_checkout("created");
                info!(user_id = %user_id, product = %product.key, checkout_id = %session.id, "Checkout session created");
                Ok(session)
            }
            Err(e) => {
                metrics::record_checkout("failed");
                Err(AppError::Upstream(e.to_string()))
            }
        }
    }

    pub async fn wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        Ok(wallets::find(&self.pool, user_id)
            .await?
            .unwrap_or_else(|| Wallet::empty(user_id)))
    }

    pub async fn subscription(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(subscriptions::find_for_user(&self.pool, user_id).await?)
    }

    /// Verify, deduplicate and apply one webhook delivery
    pub async fn handle_webhook(&self, signature_header: Option<&str>, payload: &[u8]) -> AppResult<WebhookOutcome> {
        let secret = self
            .config
            .webhook_secret
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable("payment webhooks are not configured".to_string()))?;
        let header = signature_header
            .ok_or_else(|| AppError::InvalidSignature("missing signature header".to_string()))?;

        signature::verify(
            header,
            payload,
            secret,
            Utc::now().timestamp(),
            self.config.webhook_tolerance_secs,
        )
        .map_err(|e| AppError::InvalidSignature(e.to_string()))?;

        let event: GatewayEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("invalid event payload: {}", e)))?;

        let outcome = self.apply_event(&event).await;
        match &outcome {
            Ok(result) => {
                metrics::record_webhook_event(&event.event_type, result.as_str());
                info!(event_id = %event.id, event_type = %event.event_type, outcome = result.as_str(), "Payment webhook handled");
            }
            Err(e) => {
                metrics::record_webhook_event(&event.event_type, "failed");
                warn!(event_id = %event.id, event_type = %event.event_type, error = %e, "Payment webhook failed");
            }
        }
        outcome
    }

    async fn apply_event(&self, event: &GatewayEvent) -> AppResult<WebhookOutcome> {
        let mut tx = self.pool.begin().await?;

        if !payment_events::record(&mut *tx, &event.id, &event.event_type).await? {
            return Ok(WebhookOutcome::Duplicate);
        }

        let outcome = match event.event_type.as_str() {
            "checkout.session.completed" => self.checkout_completed(&mut *tx, &event.data.object).await?,
            "customer.subscription.updated" | "customer.subscription.deleted" => {
                subscription_changed(&mut *tx, &event.event_type, &event.data.object).await?
            }
            _ => WebhookOutcome::Ignored,
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn checkout_completed(
        &self,
        conn: &mut PgConnection,
        object: &serde_json::Value,
    ) -> AppResult<WebhookOutcome> {
        let session: CompletedCheckout = serde_json::from_value(object.clone())
            .map_err(|e| AppError::BadRequest(format!("invalid checkout session: {}", e)))?;

        let user_id = session
            .metadata
            .get("user_id")
            .or(session.client_reference_id.as_ref())
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| AppError::BadRequest("checkout session without user reference".to_string()))?;
        let product_key = session
            .metadata
            .get("product_key")
            .ok_or_else(|| AppError::BadRequest("checkout session without product".to_string()))?;

        let Some(product) = self.config.products.get(product_key) else {
            warn!(checkout_id = %session.id, product = %product_key, "Completed checkout for unknown product");
            return Ok(WebhookOutcome::Ignored);
        };

        match product.kind {
            ProductKind::Coins { amount } => {
                if session.payment_status.as_deref() != Some("paid") {
                    info!(checkout_id = %session.id, "Checkout completed without payment; no coins credited");
                    return Ok(WebhookOutcome::Ignored);
                }
                let balance = wallets::credit(
                    conn,
                    user_id,
                    amount,
                    TransactionReason::Purchase,
                    Some(&session.id),
                )
                .await?;
                info!(user_id = %user_id, coins = amount, balance, "Coins credited");
            }
            ProductKind::Subscription => {
                subscriptions::activate(
                    &mut *conn,
                    user_id,
                    &product.key,
                    session.customer.as_deref(),
                    session.subscription.as_deref(),
                )
                .await?;
                info!(user_id = %user_id, product = %product.key, "Subscription activated");
            }
        }
        Ok(WebhookOutcome::Processed)
    }
}

async fn subscription_changed(
    conn: &mut PgConnection,
    event_type: &str,
    object: &serde_json::Value,
) -> AppResult<WebhookOutcome> {
    let subscription: GatewaySubscription = serde_json::from_value(object.clone())
        .map_err(|e| AppError::BadRequest(format!("invalid subscription: {}", e)))?;

    let status = if event_type == "customer.subscription.deleted" {
        "canceled"
    } else {
        subscription.status.as_str()
    };
    let period_end = subscription.current_period_end.and_then(unix_time);

    let updated = subscriptions::sync_from_provider(
        &mut *conn,
        &subscription.id,
        status,
        period_end,
        subscription.cancel_at_period_end,
    )
    .await?;

    if updated {
        Ok(WebhookOutcome::Processed)
    } else {
        // updates can arrive before the checkout that created the row
        warn!(subscription_id = %subscription.id, "Subscription event for unknown subscription");
        Ok(WebhookOutcome::Ignored)
    }
}

fn unix_time(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
