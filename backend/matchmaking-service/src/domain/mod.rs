pub mod models;
pub mod state_machine;

pub use models::*;
pub use state_machine::{resolve, CallSession, Resolution, SessionError};
