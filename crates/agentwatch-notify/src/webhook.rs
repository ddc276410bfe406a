//! Webhook notification channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use agentwatch_core::Notifier;

use crate::error::NotifyError;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Posts notifications to a single webhook endpoint.
pub struct WebhookNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> Result<(), NotifyError> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(channel = payload.channel, endpoint = %self.endpoint, "notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&self, channel: &str, subject: &str, message: &str) -> anyhow::Result<()> {
        let payload = WebhookPayload {
            channel,
            subject,
            message,
        };
        self.post(&payload).await?;
        Ok(())
    }
}
