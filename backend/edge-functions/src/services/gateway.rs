//! Payment gateway checkout client
//!
//! The gateway takes form-encoded requests authenticated with the secret key
//! as a bearer token. Only checkout-session creation is needed; everything
//! else arrives through webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// What the client needs to open the hosted checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub user_id: Uuid,
    pub product: &'a Product,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

impl CheckoutRequest<'_> {
    /// Form fields for `POST /v1/checkout/sessions`
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mode = if self.product.is_subscription() {
            "subscription"
        } else {
            "payment"
        };
        let user_id = self.user_id.to_string();

        let mut fields = vec![
            ("mode".to_string(), mode.to_string()),
            ("success_url".to_string(), self.success_url.to_string()),
            ("cancel_url".to_string(), self.cancel_url.to_string()),
            ("client_reference_id".to_string(), user_id.clone()),
            ("line_items[0][price]".to_string(), self.product.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("metadata[user_id]".to_string(), user_id.clone()),
            ("metadata[product_key]".to_string(), self.product.key.clone()),
        ];
        // subscription events carry their own metadata, not the session's
        if self.product.is_subscription() {
            fields.push(("subscription_data[metadata][user_id]".to_string(), user_id));
            fields.push((
                "subscription_data[metadata][product_key]".to_string(),
                self.product.key.clone(),
            ));
        }
        fields
    }
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

pub struct HttpGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl HttpGateway {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl CheckoutGateway for HttpGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest<'_>,
    ) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&request.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_coin_checkout_fields() {
        let product: Product = "coins_100:price_c100:coins:100".parse().unwrap();
        let user_id = Uuid::new_v4();
        let request = CheckoutRequest {
            user_id,
            product: &product,
            success_url: "lumo://ok",
            cancel_url: "lumo://cancel",
        };
        let fields = request.form_fields();

        assert_eq!(field(&fields, "mode"), Some("payment"));
        assert_eq!(field(&fields, "line_items[0][price]"), Some("price_c100"));
        assert_eq!(
            field(&fields, "client_reference_id"),
            Some(user_id.to_string().as_str())
        );
        assert_eq!(field(&fields, "metadata[product_key]"), Some("coins_100"));
        assert!(field(&fields, "subscription_data[metadata][user_id]").is_none());
    }

    #[test]
    fn test_subscription_checkout_fields() {
        let product: Product = "premium:price_p:subscription".parse().unwrap();
        let request = CheckoutRequest {
            user_id: Uuid::new_v4(),
            product: &product,
            success_url: "lumo://ok",
            cancel_url: "lumo://cancel",
        };
        let fields = request.form_fields();

        assert_eq!(field(&fields, "mode"), Some("subscription"));
        assert_eq!(
            field(&fields, "subscription_data[metadata][product_key]"),
            Some("premium")
        );
    }
}
