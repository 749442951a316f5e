//! Random-call counters

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

use crate::domain::EndReason;
use crate::services::reaper::SweepReport;

static QUEUE_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "random_call_queue_events_total",
        "Queue joins, leaves and pairings",
        &["event"]
    )
    .expect("failed to register random_call_queue_events_total")
});

static SESSIONS_COMPLETED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "random_call_sessions_completed_total",
        "Completed random-call sessions by end reason",
        &["reason"]
    )
    .expect("failed to register random_call_sessions_completed_total")
});

static REAPER_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "random_call_reaper_actions_total",
        "Rows touched by the cleanup sweep",
        &["action"]
    )
    .expect("failed to register random_call_reaper_actions_total")
});

static MATCHES_CREATED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "matches_created_total",
        "New matches by source",
        &["source"]
    )
    .expect("failed to register matches_created_total")
});

pub fn record_queue_event(event: &str) {
    QUEUE_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

pub fn record_session_completed(reason: EndReason) {
    SESSIONS_COMPLETED_TOTAL
        .with_label_values(&[reason.as_str()])
        .inc();
}

pub fn record_match_created(source: &str) {
    MATCHES_CREATED_TOTAL.with_label_values(&[source]).inc();
}

pub fn record_sweep(report: &SweepReport) {
    for (action, count) in [
        ("sessions_closed", report.sessions_closed),
        ("stale_queue_entries", report.stale_queue_entries),
        ("dangling_queue_entries", report.dangling_queue_entries),
    ] {
        if count > 0 {
            REAPER_ACTIONS_TOTAL
                .with_label_values(&[action])
                .inc_by(count);
        }
    }
}
