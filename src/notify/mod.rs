//! Push notifications through ntfy
//!
//! Delivery is fire-and-forget: failures are logged and never returned.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

/// A push notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub message: String,
    pub title: Option<String>,
    /// 1 (min) to 5 (max)
    pub priority: Option<u8>,
    /// Comma-separated tags; known tags are shown as emojis by ntfy
    pub tags: Option<String>,
    pub click_url: Option<String>,
    pub attach: Vec<String>,
    pub actions: Vec<Value>,
    pub headers: Vec<(String, String)>,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the priority, clamped to 1-5
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority.clamp(1, 5));
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// HTTP headers understood by ntfy for this notification
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(title) = &self.title {
            headers.push(("Title".to_string(), title.clone()));
        }
        if let Some(priority) = self.priority {
            headers.push(("Priority".to_string(), priority.to_string()));
        }
        if let Some(click) = &self.click_url {
            headers.push(("Click".to_string(), click.clone()));
        }
        if !self.attach.is_empty() {
            headers.push(("Attach".to_string(), self.attach.join(", ")));
        }
        if !self.actions.is_empty() {
            headers.push(("Actions".to_string(), Value::Array(self.actions.clone()).to_string()));
        }
        if let Some(tags) = &self.tags {
            headers.push(("Tags".to_string(), tags.clone()));
        }
        headers.extend(self.headers.iter().cloned());
        headers
    }
}

/// Sink for push notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification);
}

/// Notifier that drops everything; used when no topic is configured
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, notification: &Notification) {
        tracing::debug!("Notifications disabled, not sending: {}", notification.message);
    }
}

/// Posts notifications to `<server>/<topic>`
pub struct NtfyNotifier {
    client: reqwest::Client,
    url: String,
}

impl NtfyNotifier {
    pub fn new(client: reqwest::Client, server: &str, topic: &str) -> Self {
        Self {
            client,
            url: format!("{}/{}", server.trim_end_matches('/'), topic),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn notify(&self, notification: &Notification) {
        let mut request = self
            .client
            .post(&self.url)
            .body(notification.message.clone().into_bytes());
        for (name, value) in notification.header_pairs() {
            request = request.header(name, value);
        }

        match request.send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                info!("Notification sent successfully!");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("Error sending notification: {} - {}", status, body);
            }
            Err(e) => error!("Error sending notification: {}", e),
        }
    }
}
