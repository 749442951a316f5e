//! Request handlers in front of the managed third-party services
//!
//! Payment checkout and webhooks, device registration and push dispatch,
//! support email, live-stream access and SFU tokens.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;
