//! HTTP delivery to the incoming webhook.

use std::time::Duration;

use async_trait::async_trait;
use relay::{DeliveryError, NotificationMessage, NotificationSink, WebhookUrl};

use crate::WebhookPayload;

/// Upper bound on one POST, so a hung webhook cannot stall the dispatch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts rendered notifications to a Slack incoming webhook.
///
/// Exactly one attempt per message; there is no retry.
pub struct WebhookSink {
    url: WebhookUrl,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Creates a sink for the given (already decrypted) webhook URL.
    pub fn new(url: WebhookUrl) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn post(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        let payload = WebhookPayload::from(message);

        let response = self
            .client
            .post(self.url.as_str())
            .json(&payload)
            .send()
            .await
            // Strip the URL from the error; it carries the webhook secret.
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "Webhook accepted message");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
