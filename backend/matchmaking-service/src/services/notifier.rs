use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::MatchSource;

/// Tells both users about a new match
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    async fn new_match(&self, users: [Uuid; 2], source: MatchSource);
}

/// Used when no push dispatcher is configured
pub struct NoopNotifier;

#[async_trait]
impl MatchNotifier for NoopNotifier {
    async fn new_match(&self, users: [Uuid; 2], source: MatchSource) {
        tracing::debug!(
            user_a = %users[0],
            user_b = %users[1],
            source = %source,
            "Push dispatch disabled; skipping new-match notification"
        );
    }
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    user_ids: &'a [Uuid],
    title: &'a str,
    body: &'a str,
    data: HashMap<&'a str, String>,
}

/// Hands notifications to the edge-functions push endpoint
pub struct PushDispatchNotifier {
    client: reqwest::Client,
    url: String,
    admin_token: Option<String>,
}

impl PushDispatchNotifier {
    pub fn new(url: String, admin_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url,
            admin_token,
        }
    }
}

#[async_trait]
impl MatchNotifier for PushDispatchNotifier {
    async fn new_match(&self, users: [Uuid; 2], source: MatchSource) {
        let mut data = HashMap::new();
        data.insert("type", "new_match".to_string());
        data.insert("source", source.as_str().to_string());

        let request = PushRequest {
            user_ids: &users,
            title: "It's a match!",
            body: "You both said yes. Say hello.",
            data,
        };

        let mut call = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.admin_token {
            call = call.header(actix_middleware::ADMIN_TOKEN_HEADER, token);
        }

        match call.send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(source = %source, "New-match push dispatched");
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "Push dispatch rejected new-match notification");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Push dispatch request failed");
            }
        }
    }
}
