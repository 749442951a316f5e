//! Random anonymous voice-call matchmaking
//!
//! Users join a queue, get paired with a stranger, talk for a fixed time
//! under anonymous aliases and then both decide whether to match. Identities
//! are revealed only on a mutual match.

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod repository;
pub mod services;
pub mod state;
pub mod workers;
