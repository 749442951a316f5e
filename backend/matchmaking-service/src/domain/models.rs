use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error for a stored value that does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Queue row state
    QueueStatus, "queue status" {
        Searching => "searching",
        Matched => "matched",
    }
);

text_enum!(
    /// Session lifecycle: matched (waiting for both to connect) -> active (in call)
    /// -> deciding -> completed
    SessionStatus, "session status" {
        Matched => "matched",
        Active => "active",
        Deciding => "deciding",
        Completed => "completed",
    }
);

text_enum!(
    Decision, "decision" {
        Yes => "yes",
        No => "no",
        Continue => "continue",
    }
);

text_enum!(
    Outcome, "outcome" {
        Matched => "matched",
        NotMatched => "not_matched",
    }
);

text_enum!(
    EndReason, "end reason" {
        MutualMatch => "mutual_match",
        Declined => "declined",
        DecisionTimeout => "decision_timeout",
        PartnerLeft => "partner_left",
        NeverConnected => "never_connected",
        CallOverrun => "call_overrun",
        DecisionStuck => "decision_stuck",
        Orphaned => "orphaned",
    }
);

text_enum!(
    /// Source of a row in `matches`
    MatchSource, "match source" {
        Like => "like",
        RandomCall => "random_call",
    }
);

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }

    /// Name shown to clients; the call phase is `in_call`
    pub fn phase(&self) -> &'static str {
        match self {
            SessionStatus::Matched => "matched",
            SessionStatus::Active => "in_call",
            SessionStatus::Deciding => "deciding",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Which participant of a session; `A` joined the queue first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Anonymous participant identity used until both sides match
    pub fn alias(self) -> &'static str {
        match self {
            Side::A => "stranger-a",
            Side::B => "stranger-b",
        }
    }
}

/// Timing rules for a call
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub call_duration: Duration,
    pub decision_window: Duration,
    /// Rounds a pair may play before `continue` counts as consent
    pub max_rounds: i32,
    /// How long both sides have to connect to the room after pairing
    pub connect_timeout: Duration,
    /// Two users are not paired again within this period
    pub rematch_cooldown: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            call_duration: Duration::seconds(180),
            decision_window: Duration::seconds(30),
            max_rounds: 3,
            connect_timeout: Duration::seconds(45),
            rematch_cooldown: Duration::hours(24),
        }
    }
}

/// Thresholds for the periodic cleanup sweep
#[derive(Debug, Clone)]
pub struct ReaperPolicy {
    pub deciding_timeout: Duration,
    pub orphan_timeout: Duration,
    pub heartbeat_timeout: Duration,
    /// Extra time an `active` session may run past `ends_at`
    pub active_grace: Duration,
}

impl Default for ReaperPolicy {
    fn default() -> Self {
        Self {
            deciding_timeout: Duration::minutes(5),
            orphan_timeout: Duration::minutes(10),
            heartbeat_timeout: Duration::minutes(2),
            active_grace: CallPolicy::default().decision_window,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub user_id: Uuid,
    pub status: QueueStatus,
    pub session_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn is_stale(&self, now: DateTime<Utc>, heartbeat_timeout: Duration) -> bool {
        now - self.last_heartbeat_at > heartbeat_timeout
    }
}

/// What the queue endpoints report back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueueState {
    Idle,
    Searching { joined_at: DateTime<Utc> },
    Matched { session_id: Uuid },
}

impl From<Option<QueueEntry>> for QueueState {
    fn from(entry: Option<QueueEntry>) -> Self {
        match entry {
            None => QueueState::Idle,
            Some(QueueEntry {
                status: QueueStatus::Matched,
                session_id: Some(session_id),
                ..
            }) => QueueState::Matched { session_id },
            Some(entry) => QueueState::Searching {
                joined_at: entry.joined_at,
            },
        }
    }
}

/// Public profile fields revealed after a mutual match
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartnerView {
    Anonymous { alias: &'static str },
    Revealed { profile: ProfileSummary },
}

/// A session as seen by one of its participants
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub status: SessionStatus,
    pub phase: &'static str,
    pub round: i32,
    pub max_rounds: i32,
    pub you: &'static str,
    pub partner: PartnerView,
    pub joined: bool,
    pub partner_joined: bool,
    pub your_decision: Option<Decision>,
    /// Whether the partner has decided this round; never what they decided
    pub partner_decided: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub decision_deadline: Option<DateTime<Utc>>,
    pub outcome: Option<Outcome>,
    pub end_reason: Option<EndReason>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub source: MatchSource,
    pub created_at: DateTime<Utc>,
    pub partner: ProfileSummary,
}
