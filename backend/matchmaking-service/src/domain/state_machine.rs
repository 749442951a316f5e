//! Random-call session state machine
//!
//! All transitions are pure functions of the current row, the acting side and
//! `now`; persistence and notification happen in the service layer. Deadlines
//! are evaluated lazily through [`CallSession::advance`], so a session that
//! nobody touches is only moved forward on the next read, write or sweep.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{
    CallPolicy, Decision, EndReason, Outcome, PartnerView, ProfileSummary, ReaperPolicy,
    SessionStatus, SessionView, Side,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("user is not a participant of this session")]
    NotParticipant,

    #[error("session is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: SessionStatus,
    },

    #[error("decision already submitted for this round")]
    DecisionAlreadySubmitted,
}

/// Result of combining the two decisions of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Matched,
    NotMatched,
    /// Play another call round
    Extend,
}

/// Combine both sides' decisions for `round`.
///
/// A `no` ends the session at once, without waiting for the other side.
/// `continue` asks for another round; on the last allowed round it counts as
/// consent.
pub fn resolve(
    a: Option<Decision>,
    b: Option<Decision>,
    round: i32,
    max_rounds: i32,
) -> Resolution {
    if a == Some(Decision::No) || b == Some(Decision::No) {
        return Resolution::NotMatched;
    }

    match (a, b) {
        (Some(Decision::Yes), Some(Decision::Yes)) => Resolution::Matched,
        (Some(_), Some(_)) if round < max_rounds => Resolution::Extend,
        (Some(_), Some(_)) => Resolution::Matched,
        _ => Resolution::Pending,
    }
}

/// A random-call session row
#[derive(Debug, Clone, PartialEq)]
pub struct CallSession {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub status: SessionStatus,
    pub outcome: Option<Outcome>,
    pub end_reason: Option<EndReason>,
    pub round: i32,
    pub user_a_joined: bool,
    pub user_b_joined: bool,
    pub user_a_decision: Option<Decision>,
    pub user_b_decision: Option<Decision>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub deciding_started_at: Option<DateTime<Utc>>,
    pub decision_deadline: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CallSession {
    /// Fresh session for a pair taken off the queue; `user_a` joined first
    pub fn pair(user_a: Uuid, user_b: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_a,
            user_b,
            status: SessionStatus::Matched,
            outcome: None,
            end_reason: None,
            round: 1,
            user_a_joined: false,
            user_b_joined: false,
            user_a_decision: None,
            user_b_decision: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            ends_at: None,
            deciding_started_at: None,
            decision_deadline: None,
            completed_at: None,
        }
    }

    pub fn side_of(&self, user_id: Uuid) -> Result<Side, SessionError> {
        if user_id == self.user_a {
            Ok(Side::A)
        } else if user_id == self.user_b {
            Ok(Side::B)
        } else {
            Err(SessionError::NotParticipant)
        }
    }

    pub fn user(&self, side: Side) -> Uuid {
        match side {
            Side::A => self.user_a,
            Side::B => self.user_b,
        }
    }

    pub fn joined(&self, side: Side) -> bool {
        match side {
            Side::A => self.user_a_joined,
            Side::B => self.user_b_joined,
        }
    }

    pub fn decision(&self, side: Side) -> Option<Decision> {
        match side {
            Side::A => self.user_a_decision,
            Side::B => self.user_b_decision,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_mutual_match(&self) -> bool {
        self.outcome == Some(Outcome::Matched)
    }

    fn set_decision(&mut self, side: Side, decision: Option<Decision>) {
        match side {
            Side::A => self.user_a_decision = decision,
            Side::B => self.user_b_decision = decision,
        }
    }

    fn require(&self, expected: &'static str, allowed: &[SessionStatus]) -> Result<(), SessionError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected,
                actual: self.status,
            })
        }
    }

    fn start_round(&mut self, now: DateTime<Utc>, policy: &CallPolicy) {
        self.status = SessionStatus::Active;
        self.started_at = Some(now);
        self.ends_at = Some(now + policy.call_duration);
        self.deciding_started_at = None;
        self.decision_deadline = None;
        self.user_a_decision = None;
        self.user_b_decision = None;
    }

    fn open_decision(&mut self, at: DateTime<Utc>, policy: &CallPolicy) {
        self.status = SessionStatus::Deciding;
        self.deciding_started_at = Some(at);
        self.decision_deadline = Some(at + policy.decision_window);
        self.user_a_decision = None;
        self.user_b_decision = None;
    }

    fn complete(&mut self, outcome: Outcome, reason: EndReason, now: DateTime<Utc>) {
        self.status = SessionStatus::Completed;
        self.outcome = Some(outcome);
        self.end_reason = Some(reason);
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Record that `side` connected to the room. The call starts once both
    /// sides are in. Rejoining during the call (reconnect) is accepted.
    pub fn mark_joined(
        &mut self,
        side: Side,
        now: DateTime<Utc>,
        policy: &CallPolicy,
    ) -> Result<bool, SessionError> {
        self.require("matched or active", &[SessionStatus::Matched, SessionStatus::Active])?;

        let already = self.joined(side);
        match side {
            Side::A => self.user_a_joined = true,
            Side::B => self.user_b_joined = true,
        }

        if self.status == SessionStatus::Matched && self.user_a_joined && self.user_b_joined {
            self.start_round(now, policy);
            self.updated_at = now;
            return Ok(true);
        }

        if already {
            return Ok(false);
        }
        self.updated_at = now;
        Ok(true)
    }

    /// Either side ends the call phase early. A second request after the
    /// decision window opened is a no-op.
    pub fn end_call_phase(
        &mut self,
        now: DateTime<Utc>,
        policy: &CallPolicy,
    ) -> Result<bool, SessionError> {
        if self.status == SessionStatus::Deciding {
            return Ok(false);
        }
        self.require("active", &[SessionStatus::Active])?;

        self.open_decision(now, policy);
        self.updated_at = now;
        Ok(true)
    }

    /// Record `side`'s decision for the current round and apply [`resolve`].
    ///
    /// Resubmitting the same decision is accepted without change; changing a
    /// recorded decision is rejected.
    pub fn submit_decision(
        &mut self,
        side: Side,
        decision: Decision,
        now: DateTime<Utc>,
        policy: &CallPolicy,
    ) -> Result<bool, SessionError> {
        self.require("deciding", &[SessionStatus::Deciding])?;

        match self.decision(side) {
            Some(existing) if existing == decision => return Ok(false),
            Some(_) => return Err(SessionError::DecisionAlreadySubmitted),
            None => self.set_decision(side, Some(decision)),
        }
        self.updated_at = now;

        match resolve(
            self.user_a_decision,
            self.user_b_decision,
            self.round,
            policy.max_rounds,
        ) {
            Resolution::Matched => self.complete(Outcome::Matched, EndReason::MutualMatch, now),
            Resolution::NotMatched => self.complete(Outcome::NotMatched, EndReason::Declined, now),
            Resolution::Extend => {
                self.round += 1;
                self.start_round(now, policy);
            }
            Resolution::Pending => {}
        }
        Ok(true)
    }

    /// `side` walks away. Leaving a completed session is a no-op.
    pub fn leave(&mut self, _side: Side, now: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.complete(Outcome::NotMatched, EndReason::PartnerLeft, now);
        true
    }

    /// Apply every deadline that has passed by `now`.
    ///
    /// Phase changes are stamped with the deadline that caused them, not with
    /// `now`, so a late read reaches the same state as a timely one.
    pub fn advance(&mut self, now: DateTime<Utc>, policy: &CallPolicy) -> bool {
        let mut changed = false;

        if self.status == SessionStatus::Matched && now >= self.created_at + policy.connect_timeout {
            self.complete(Outcome::NotMatched, EndReason::NeverConnected, now);
            return true;
        }

        if self.status == SessionStatus::Active {
            if let Some(ends_at) = self.ends_at.filter(|ends_at| now >= *ends_at) {
                self.open_decision(ends_at, policy);
                self.updated_at = now;
                changed = true;
            }
        }

        if self.status == SessionStatus::Deciding {
            if let Some(deadline) = self.decision_deadline {
                if now >= deadline {
                    self.complete(Outcome::NotMatched, EndReason::DecisionTimeout, now);
                    changed = true;
                }
            }
        }

        changed
    }

    /// Cleanup rule for sessions that clients abandoned.
    pub fn reap_verdict(&self, now: DateTime<Utc>, policy: &ReaperPolicy) -> Option<EndReason> {
        match self.status {
            SessionStatus::Completed => None,
            SessionStatus::Deciding => self
                .deciding_started_at
                .filter(|started| now - *started > policy.deciding_timeout)
                .map(|_| EndReason::DecisionStuck),
            SessionStatus::Active
                if self
                    .ends_at
                    .is_some_and(|ends_at| now > ends_at + policy.active_grace) =>
            {
                Some(EndReason::CallOverrun)
            }
            SessionStatus::Matched | SessionStatus::Active
                if now - self.updated_at > policy.orphan_timeout =>
            {
                Some(EndReason::Orphaned)
            }
            _ => None,
        }
    }

    /// Force-close with `reason`; used by the sweep
    pub fn reap(&mut self, reason: EndReason, now: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.complete(Outcome::NotMatched, reason, now);
        true
    }

    /// Token lifetime end for the SFU room: the current call phase plus the
    /// decision window, or the connect deadline while waiting for both sides.
    pub fn room_deadline(&self, policy: &CallPolicy) -> Option<DateTime<Utc>> {
        match self.status {
            SessionStatus::Matched => {
                Some(self.created_at + policy.connect_timeout + policy.call_duration + policy.decision_window)
            }
            SessionStatus::Active => self.ends_at.map(|ends_at| ends_at + policy.decision_window),
            _ => None,
        }
    }

    /// Render the session for `side`. `partner_profile` is shown only when the
    /// session ended in a mutual match.
    pub fn view_for(
        &self,
        side: Side,
        policy: &CallPolicy,
        partner_profile: Option<ProfileSummary>,
    ) -> SessionView {
        let partner = match (self.is_mutual_match(), partner_profile) {
            (true, Some(profile)) => PartnerView::Revealed { profile },
            _ => PartnerView::Anonymous {
                alias: side.other().alias(),
            },
        };

        SessionView {
            id: self.id,
            status: self.status,
            phase: self.status.phase(),
            round: self.round,
            max_rounds: policy.max_rounds,
            you: side.alias(),
            partner,
            joined: self.joined(side),
            partner_joined: self.joined(side.other()),
            your_decision: self.decision(side),
            partner_decided: self.decision(side.other()).is_some(),
            started_at: self.started_at,
            ends_at: self.ends_at,
            decision_deadline: self.decision_deadline,
            outcome: self.outcome,
            end_reason: self.end_reason,
            completed_at: self.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn policy() -> CallPolicy {
        CallPolicy::default()
    }

    fn session(now: DateTime<Utc>) -> CallSession {
        CallSession::pair(Uuid::new_v4(), Uuid::new_v4(), now)
    }

    fn in_call(now: DateTime<Utc>) -> CallSession {
        let mut s = session(now);
        s.mark_joined(Side::A, now, &policy()).unwrap();
        s.mark_joined(Side::B, now, &policy()).unwrap();
        s
    }

    fn deciding(now: DateTime<Utc>) -> CallSession {
        let mut s = in_call(now);
        s.end_call_phase(now, &policy()).unwrap();
        s
    }

    fn assert_completed(s: &CallSession, outcome: Outcome, reason: EndReason) {
        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.outcome, Some(outcome));
        assert_eq!(s.end_reason, Some(reason));
        assert!(s.completed_at.is_some());
    }

    #[test]
    fn test_resolve_table() {
        use Decision::*;
        assert_eq!(resolve(None, None, 1, 3), Resolution::Pending);
        assert_eq!(resolve(Some(Yes), None, 1, 3), Resolution::Pending);
        assert_eq!(resolve(Some(No), None, 1, 3), Resolution::NotMatched);
        assert_eq!(resolve(None, Some(No), 1, 3), Resolution::NotMatched);
        assert_eq!(resolve(Some(Yes), Some(No), 1, 3), Resolution::NotMatched);
        assert_eq!(resolve(Some(Continue), Some(No), 1, 3), Resolution::NotMatched);
        assert_eq!(resolve(Some(Yes), Some(Yes), 1, 3), Resolution::Matched);
        assert_eq!(resolve(Some(Yes), Some(Continue), 1, 3), Resolution::Extend);
        assert_eq!(resolve(Some(Continue), Some(Continue), 2, 3), Resolution::Extend);
        assert_eq!(resolve(Some(Continue), Some(Continue), 3, 3), Resolution::Matched);
        assert_eq!(resolve(Some(Yes), Some(Continue), 3, 3), Resolution::Matched);
    }

    #[test]
    fn test_pair_starts_matched() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(s.status, SessionStatus::Matched);
        assert_eq!(s.round, 1);
        assert_ne!(s.user_a, s.user_b);
        assert!(s.outcome.is_none() && s.end_reason.is_none());
    }

    #[test]
    fn test_side_of() {
        let s = session(Utc::now());
        assert_eq!(s.side_of(s.user_a), Ok(Side::A));
        assert_eq!(s.side_of(s.user_b), Ok(Side::B));
        assert_eq!(s.side_of(Uuid::new_v4()), Err(SessionError::NotParticipant));
    }

    #[test]
    fn test_call_starts_when_both_join() {
        let now = Utc::now();
        let mut s = session(now);

        assert!(s.mark_joined(Side::A, now, &policy()).unwrap());
        assert_eq!(s.status, SessionStatus::Matched);
        assert!(!s.mark_joined(Side::A, now, &policy()).unwrap());

        let later = now + Duration::seconds(5);
        assert!(s.mark_joined(Side::B, later, &policy()).unwrap());
        assert_eq!(s.status, SessionStatus::Active);
        assert_eq!(s.started_at, Some(later));
        assert_eq!(s.ends_at, Some(later + Duration::seconds(180)));
    }

    #[test]
    fn test_rejoin_during_call_is_accepted() {
        let now = Utc::now();
        let mut s = in_call(now);
        assert!(!s.mark_joined(Side::B, now + Duration::seconds(30), &policy()).unwrap());
        assert_eq!(s.status, SessionStatus::Active);
    }

    #[test]
    fn test_join_after_call_rejected() {
        let now = Utc::now();
        let mut s = deciding(now);
        assert!(matches!(
            s.mark_joined(Side::A, now, &policy()),
            Err(SessionError::InvalidState { actual: SessionStatus::Deciding, .. })
        ));
    }

    #[test]
    fn test_end_call_opens_decision_window() {
        let now = Utc::now();
        let mut s = in_call(now);
        let t = now + Duration::seconds(60);

        assert!(s.end_call_phase(t, &policy()).unwrap());
        assert_eq!(s.status, SessionStatus::Deciding);
        assert_eq!(s.deciding_started_at, Some(t));
        assert_eq!(s.decision_deadline, Some(t + Duration::seconds(30)));

        // the other side pressing "end" too is harmless
        assert!(!s.end_call_phase(t, &policy()).unwrap());
    }

    #[test]
    fn test_end_call_before_connect_rejected() {
        let now = Utc::now();
        let mut s = session(now);
        assert!(s.end_call_phase(now, &policy()).is_err());
    }

    #[test]
    fn test_both_yes_is_mutual_match() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::A, Decision::Yes, now, &policy()).unwrap();
        assert_eq!(s.status, SessionStatus::Deciding);
        s.submit_decision(Side::B, Decision::Yes, now, &policy()).unwrap();

        assert_completed(&s, Outcome::Matched, EndReason::MutualMatch);
        assert!(s.is_mutual_match());
    }

    #[test]
    fn test_no_ends_immediately() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::B, Decision::No, now, &policy()).unwrap();
        assert_completed(&s, Outcome::NotMatched, EndReason::Declined);
    }

    #[test]
    fn test_decision_cannot_change() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::A, Decision::Yes, now, &policy()).unwrap();

        assert!(!s.submit_decision(Side::A, Decision::Yes, now, &policy()).unwrap());
        assert_eq!(
            s.submit_decision(Side::A, Decision::No, now, &policy()),
            Err(SessionError::DecisionAlreadySubmitted)
        );
        assert_eq!(s.user_a_decision, Some(Decision::Yes));
    }

    #[test]
    fn test_decision_outside_deciding_rejected() {
        let now = Utc::now();
        let mut s = in_call(now);
        assert!(matches!(
            s.submit_decision(Side::A, Decision::Yes, now, &policy()),
            Err(SessionError::InvalidState { expected: "deciding", .. })
        ));
    }

    #[test]
    fn test_continue_extends_with_new_round() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::A, Decision::Continue, now, &policy()).unwrap();
        let t = now + Duration::seconds(10);
        s.submit_decision(Side::B, Decision::Yes, t, &policy()).unwrap();

        assert_eq!(s.status, SessionStatus::Active);
        assert_eq!(s.round, 2);
        assert_eq!(s.started_at, Some(t));
        assert_eq!(s.ends_at, Some(t + Duration::seconds(180)));
        assert_eq!(s.user_a_decision, None);
        assert_eq!(s.user_b_decision, None);
        assert!(s.decision_deadline.is_none());

        // a fresh round accepts a different decision
        s.end_call_phase(t, &policy()).unwrap();
        s.submit_decision(Side::A, Decision::No, t, &policy()).unwrap();
        assert_completed(&s, Outcome::NotMatched, EndReason::Declined);
    }

    #[test]
    fn test_continue_on_last_round_matches() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.round = 3;
        s.submit_decision(Side::A, Decision::Continue, now, &policy()).unwrap();
        s.submit_decision(Side::B, Decision::Continue, now, &policy()).unwrap();
        assert_completed(&s, Outcome::Matched, EndReason::MutualMatch);
    }

    #[test]
    fn test_leave_from_any_open_state() {
        let now = Utc::now();
        for mut s in [session(now), in_call(now), deciding(now)] {
            assert!(s.leave(Side::A, now));
            assert_completed(&s, Outcome::NotMatched, EndReason::PartnerLeft);
            assert!(!s.leave(Side::B, now));
        }
    }

    #[test]
    fn test_completed_is_terminal() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::A, Decision::No, now, &policy()).unwrap();
        let snapshot = s.clone();

        assert!(s.mark_joined(Side::A, now, &policy()).is_err());
        assert!(s.end_call_phase(now, &policy()).is_err());
        assert!(s.submit_decision(Side::B, Decision::Yes, now, &policy()).is_err());
        assert!(!s.advance(now + Duration::hours(1), &policy()));
        assert!(!s.reap(EndReason::Orphaned, now));
        assert_eq!(s, snapshot);
    }

    #[test]
    fn test_advance_never_connected() {
        let now = Utc::now();
        let mut s = session(now);
        s.mark_joined(Side::A, now, &policy()).unwrap();

        assert!(!s.advance(now + Duration::seconds(44), &policy()));
        assert!(s.advance(now + Duration::seconds(45), &policy()));
        assert_completed(&s, Outcome::NotMatched, EndReason::NeverConnected);
    }

    #[test]
    fn test_advance_call_into_deciding() {
        let now = Utc::now();
        let mut s = in_call(now);
        let ends_at = s.ends_at.unwrap();

        assert!(!s.advance(ends_at - Duration::seconds(1), &policy()));
        assert!(s.advance(ends_at + Duration::seconds(3), &policy()));
        assert_eq!(s.status, SessionStatus::Deciding);
        assert_eq!(s.deciding_started_at, Some(ends_at));
        assert_eq!(s.decision_deadline, Some(ends_at + Duration::seconds(30)));
    }

    #[test]
    fn test_advance_late_read_times_out_decision() {
        let now = Utc::now();
        let mut s = in_call(now);
        let ends_at = s.ends_at.unwrap();

        // nobody looked at the session for the whole decision window
        assert!(s.advance(ends_at + Duration::seconds(31), &policy()));
        assert_completed(&s, Outcome::NotMatched, EndReason::DecisionTimeout);
    }

    #[test]
    fn test_advance_one_sided_yes_times_out() {
        let now = Utc::now();
        let mut s = deciding(now);
        s.submit_decision(Side::A, Decision::Yes, now, &policy()).unwrap();
        assert!(s.advance(now + Duration::seconds(30), &policy()));
        assert_completed(&s, Outcome::NotMatched, EndReason::DecisionTimeout);
    }

    #[test]
    fn test_reap_verdicts() {
        let now = Utc::now();
        let rp = ReaperPolicy::default();

        let stuck = deciding(now);
        assert_eq!(stuck.reap_verdict(now + Duration::minutes(4), &rp), None);
        assert_eq!(
            stuck.reap_verdict(now + Duration::minutes(6), &rp),
            Some(EndReason::DecisionStuck)
        );

        let running = in_call(now);
        let ends_at = running.ends_at.unwrap();
        assert_eq!(running.reap_verdict(ends_at + Duration::seconds(29), &rp), None);
        assert_eq!(
            running.reap_verdict(ends_at + Duration::seconds(31), &rp),
            Some(EndReason::CallOverrun)
        );

        let waiting = session(now);
        assert_eq!(waiting.reap_verdict(now + Duration::minutes(9), &rp), None);
        assert_eq!(
            waiting.reap_verdict(now + Duration::minutes(11), &rp),
            Some(EndReason::Orphaned)
        );

        let mut done = deciding(now);
        done.leave(Side::A, now);
        assert_eq!(done.reap_verdict(now + Duration::days(1), &rp), None);
    }

    #[test]
    fn test_room_deadline() {
        let now = Utc::now();
        let s = in_call(now);
        assert_eq!(
            s.room_deadline(&policy()),
            Some(s.ends_at.unwrap() + Duration::seconds(30))
        );
        assert_eq!(deciding(now).room_deadline(&policy()), None);
        assert!(session(now).room_deadline(&policy()).is_some());
    }

    #[test]
    fn test_view_hides_identity_until_match() {
        let now = Utc::now();
        let mut s = deciding(now);
        let profile = ProfileSummary {
            id: s.user_b,
            display_name: "Bea".to_string(),
            avatar_url: None,
        };

        s.submit_decision(Side::B, Decision::Yes, now, &policy()).unwrap();
        let view = s.view_for(Side::A, &policy(), Some(profile.clone()));
        assert_eq!(view.partner, PartnerView::Anonymous { alias: "stranger-b" });
        assert!(view.partner_decided);
        assert_eq!(view.your_decision, None);
        assert_eq!(view.phase, "deciding");

        s.submit_decision(Side::A, Decision::Yes, now, &policy()).unwrap();
        let view = s.view_for(Side::A, &policy(), Some(profile.clone()));
        assert_eq!(view.partner, PartnerView::Revealed { profile });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["you"], "stranger-a");
        assert_eq!(json["outcome"], "matched");
        assert_eq!(json["partner"]["kind"], "revealed");
    }
}
