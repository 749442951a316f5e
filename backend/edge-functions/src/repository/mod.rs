pub mod devices;
pub mod live;
pub mod payment_events;
pub mod subscriptions;
pub mod support;
pub mod wallets;
