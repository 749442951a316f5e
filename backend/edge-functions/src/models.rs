use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// What a purchasable product grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductKind {
    Subscription,
    Coins { amount: i64 },
}

/// One catalog entry: our key, the gateway price it maps to, and the grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub key: String,
    pub price_id: String,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl Product {
    pub fn is_subscription(&self) -> bool {
        self.kind == ProductKind::Subscription
    }
}

impl FromStr for Product {
    type Err = ParseError;

    /// `key:price_id:subscription` or `key:price_id:coins:<amount>`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.trim().split(':').map(str::trim).collect();
        let (key, price_id) = match parts.as_slice() {
            [key, price_id, ..] if !key.is_empty() && !price_id.is_empty() => (*key, *price_id),
            _ => return Err(ParseError::new("product", raw)),
        };

        let kind = match &parts[2..] {
            ["subscription"] => ProductKind::Subscription,
            ["coins", amount] => match amount.parse::<i64>() {
                Ok(amount) if amount > 0 => ProductKind::Coins { amount },
                _ => return Err(ParseError::new("coin amount", *amount)),
            },
            _ => return Err(ParseError::new("product", raw)),
        };

        Ok(Product {
            key: key.to_string(),
            price_id: price_id.to_string(),
            kind,
        })
    }
}

/// Products keyed by our product key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog(BTreeMap<String, Product>);

impl ProductCatalog {
    /// Comma-separated list of [`Product`] entries
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut products = BTreeMap::new();
        for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
            let product: Product = entry.parse()?;
            if products.insert(product.key.clone(), product).is_some() {
                return Err(ParseError::new("duplicate product", entry.trim()));
            }
        }
        Ok(Self(products))
    }

    pub fn get(&self, key: &str) -> Option<&Product> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Live,
    Ended,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Live => "live",
            StreamStatus::Ended => "ended",
        }
    }
}

impl FromStr for StreamStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(StreamStatus::Live),
            "ended" => Ok(StreamStatus::Ended),
            other => Err(ParseError::new("stream status", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Wallet {
    pub user_id: Uuid,
    pub coin_balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            coin_balance: 0,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subscription {
    pub user_id: Uuid,
    pub product_key: String,
    pub status: String,
    #[serde(skip)]
    pub provider_customer_id: Option<String>,
    #[serde(skip)]
    pub provider_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Statuses the gateway uses for a subscription that should unlock features
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "trialing")
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Gift {
    pub id: Uuid,
    pub name: String,
    pub coin_price: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveStream {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub join_gift_id: Option<Uuid>,
    pub status: StreamStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl LiveStream {
    pub fn is_live(&self) -> bool {
        self.status == StreamStatus::Live
    }

    /// Viewers need a grant only when the stream has a join gift
    pub fn is_free(&self) -> bool {
        self.join_gift_id.is_none()
    }
}

/// How the caller relates to a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveRole {
    Host,
    Viewer,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveAccess {
    pub stream_id: Uuid,
    pub role: LiveRole,
    pub has_access: bool,
    pub join_gift: Option<Gift>,
}
