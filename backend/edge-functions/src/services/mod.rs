pub mod gateway;
pub mod live;
pub mod mailer;
pub mod payments;
pub mod push;
pub mod rate_limit;
pub mod signature;
pub mod support;

pub use gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession, GatewayError, HttpGateway};
pub use live::{GiftPurchase, LiveService, LiveToken};
pub use mailer::Mailer;
pub use payments::{PaymentsService, WebhookOutcome};
pub use push::{PushReport, PushRequest, PushService};
pub use rate_limit::RateLimiter;
pub use support::{SupportReceipt, SupportRequest, SupportService};
