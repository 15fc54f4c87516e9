//! Best-effort operator notifications.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotificationSettings;
use crate::error::{AppError, AppResult};

/// Sends short messages to the service owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns whether the notification was accepted. Callers never fail on `false` or `Err`.
    async fn notify_owner(&self, title: &str, content: &str) -> AppResult<bool>;
}

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    title: &'a str,
    content: &'a str,
}

/// Posts notifications as JSON to a configured webhook.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: Option<String>,
    token: Option<SecretString>,
}

impl WebhookNotifier {
    pub fn new(config: &NotificationSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_owner(&self, title: &str, content: &str) -> AppResult<bool> {
        let Some(ref url) = self.webhook_url else {
            debug!("Owner notification skipped (no webhook configured): {}", title);
            return Ok(false);
        };

        let mut req = self
            .client
            .post(url)
            .json(&NotificationPayload { title, content });
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let response = req
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Notification request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(
                "Notification webhook rejected '{}' with status {}",
                title,
                response.status()
            );
            return Ok(false);
        }

        Ok(true)
    }
}
