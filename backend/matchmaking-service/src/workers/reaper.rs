//! Periodic random-call cleanup
//!
//! Closes sessions nobody is driving forward any more and drops queue rows
//! whose clients went away. The same sweep is reachable on demand through
//! `POST /internal/random-call/cleanup`.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::services::Reaper;

/// Delay before the first sweep so startup migrations and traffic settle
const STARTUP_DELAY: Duration = Duration::from_secs(5);

const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Run the sweep loop until the task is aborted
pub async fn run(reaper: Arc<Reaper>, every: Duration) -> anyhow::Result<()> {
    tracing::info!(interval_secs = every.as_secs(), "Starting random-call reaper");

    tokio::time::sleep(STARTUP_DELAY).await;

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut consecutive_failures = 0u32;

    loop {
        ticker.tick().await;

        match reaper.sweep().await {
            Ok(report) => {
                if consecutive_failures > 0 {
                    tracing::info!(
                        previous_failures = consecutive_failures,
                        "Random-call reaper recovered"
                    );
                }
                consecutive_failures = 0;

                if report.is_empty() {
                    tracing::debug!(
                        sessions_examined = report.sessions_examined,
                        "Reaper sweep: nothing to clean"
                    );
                } else {
                    tracing::info!(
                        sessions_examined = report.sessions_examined,
                        sessions_closed = report.sessions_closed,
                        stale_queue_entries = report.stale_queue_entries,
                        dangling_queue_entries = report.dangling_queue_entries,
                        "Reaper sweep finished"
                    );
                }
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    tracing::error!(
                        consecutive_failures,
                        error = %e,
                        "Reaper sweep failing repeatedly"
                    );
                } else {
                    tracing::warn!(
                        consecutive_failures,
                        error = %e,
                        "Reaper sweep failed"
                    );
                }
            }
        }
    }
}
