//! SQL access for the random-call and matching tables.
//!
//! Functions are generic over `PgExecutor` so callers can run them on the pool
//! or inside a transaction (`&mut *tx`).

pub mod events;
pub mod likes;
pub mod matches;
pub mod queue;
pub mod sessions;
