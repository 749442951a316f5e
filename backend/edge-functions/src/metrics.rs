//! Counters for the third-party integrations

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

static WEBHOOK_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "payment_webhook_events_total",
        "Payment webhook deliveries by event type and result",
        &["event_type", "result"]
    )
    .expect("failed to register payment_webhook_events_total")
});

static CHECKOUT_SESSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "checkout_sessions_total",
        "Checkout sessions requested from the gateway",
        &["result"]
    )
    .expect("failed to register checkout_sessions_total")
});

static PUSH_DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "push_deliveries_total",
        "Push deliveries by outcome",
        &["outcome"]
    )
    .expect("failed to register push_deliveries_total")
});

static SUPPORT_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "support_requests_total",
        "Support requests by result",
        &["result"]
    )
    .expect("failed to register support_requests_total")
});

static COINS_SPENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "coins_spent_total",
        "Coins debited from wallets",
        &["reason"]
    )
    .expect("failed to register coins_spent_total")
});

pub fn record_webhook_event(event_type: &str, result: &str) {
    WEBHOOK_EVENTS_TOTAL
        .with_label_values(&[event_type, result])
        .inc();
}

pub fn record_checkout(result: &str) {
    CHECKOUT_SESSIONS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_push(delivered: usize, failed: usize, pruned: usize) {
    PUSH_DELIVERIES_TOTAL
        .with_label_values(&["delivered"])
        .inc_by(delivered as u64);
    PUSH_DELIVERIES_TOTAL
        .with_label_values(&["failed"])
        .inc_by(failed as u64);
    PUSH_DELIVERIES_TOTAL
        .with_label_values(&["pruned"])
        .inc_by(pruned as u64);
}

pub fn record_support_request(result: &str) {
    SUPPORT_REQUESTS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_coins_spent(reason: &str, amount: i64) {
    if amount > 0 {
        COINS_SPENT_TOTAL
            .with_label_values(&[reason])
            .inc_by(amount as u64);
    }
}
