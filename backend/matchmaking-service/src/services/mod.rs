pub mod likes;
pub mod matchmaker;
pub mod notifier;
pub mod reaper;
pub mod sessions;

pub use likes::{LikeOutcome, LikeService};
pub use matchmaker::Matchmaker;
pub use notifier::{MatchNotifier, NoopNotifier, PushDispatchNotifier};
pub use reaper::{Reaper, SweepReport};
pub use sessions::{RoomAccess, SessionService};
