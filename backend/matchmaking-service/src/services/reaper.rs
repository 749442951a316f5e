use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CallPolicy, EndReason, ReaperPolicy};
use crate::error::AppResult;
use crate::metrics;
use crate::repository::{queue, sessions};
use crate::services::sessions::persist;

/// Upper bound on sessions examined per sweep
const SWEEP_BATCH: i64 = 500;

/// What one sweep did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub sessions_examined: u64,
    pub sessions_closed: u64,
    pub closed_by_reason: BTreeMap<&'static str, u64>,
    pub stale_queue_entries: u64,
    pub dangling_queue_entries: u64,
}

impl SweepReport {
    fn record_closed(&mut self, reason: EndReason) {
        self.sessions_closed += 1;
        *self.closed_by_reason.entry(reason.as_str()).or_default() += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.sessions_closed == 0 && self.stale_queue_entries == 0 && self.dangling_queue_entries == 0
    }
}

/// Reconciles sessions and queue rows that clients abandoned
pub struct Reaper {
    pool: PgPool,
    call_policy: CallPolicy,
    policy: ReaperPolicy,
}

impl Reaper {
    pub fn new(pool: PgPool, call_policy: CallPolicy, policy: ReaperPolicy) -> Self {
        Self {
            pool,
            call_policy,
            policy,
        }
    }

    /// Close one session if the sweep rules or its own deadlines say so.
    /// Returns the end reason when this call closed it.
    async fn reap_session(&self, session_id: Uuid, now: DateTime<Utc>) -> AppResult<Option<EndReason>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut session) = sessions::lock(&mut *tx, session_id).await? else {
            return Ok(None);
        };
        if session.is_terminal() {
            return Ok(None);
        }

        let changed = match session.reap_verdict(now, &self.policy) {
            Some(reason) => session.reap(reason, now),
            None => session.advance(now, &self.call_policy),
        };
        if !changed {
            return Ok(None);
        }

        persist(&mut *tx, &session, false).await?;
        tx.commit().await?;

        Ok(session.end_reason.filter(|_| session.is_terminal()))
    }

    /// One full cleanup pass
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        let now = Utc::now();
        let mut report = SweepReport::default();

        let open = sessions::open_session_ids(&self.pool, SWEEP_BATCH).await?;
        report.sessions_examined = open.len() as u64;

        for session_id in open {
            match self.reap_session(session_id, now).await {
                Ok(Some(reason)) => {
                    info!(session_id = %session_id, end_reason = %reason, "Reaped random-call session");
                    report.record_closed(reason);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Failed to reap random-call session");
                }
            }
        }

        let stale = queue::delete_stale_searching(&self.pool, now - self.policy.heartbeat_timeout).await?;
        report.stale_queue_entries = stale.len() as u64;

        report.dangling_queue_entries = queue::delete_dangling_matched(&self.pool).await?;

        metrics::record_sweep(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_by_reason() {
        let mut report = SweepReport::default();
        assert!(report.is_empty());

        report.record_closed(EndReason::Orphaned);
        report.record_closed(EndReason::Orphaned);
        report.record_closed(EndReason::DecisionStuck);

        assert_eq!(report.sessions_closed, 3);
        assert_eq!(report.closed_by_reason.get("orphaned"), Some(&2));
        assert_eq!(report.closed_by_reason.get("decision_stuck"), Some(&1));
        assert!(!report.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["closed_by_reason"]["orphaned"], 2);
    }
}
