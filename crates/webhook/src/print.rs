//! Dry-run delivery: writes the webhook body to stdout instead of posting it.

use std::io::Write;

use async_trait::async_trait;
use relay::{DeliveryError, NotificationMessage, NotificationSink};

use crate::WebhookPayload;

/// Prints each payload as one line of JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintSink;

impl PrintSink {
    /// Serialises the payload exactly as [`crate::WebhookSink`] would send it.
    pub fn encode(message: &NotificationMessage) -> Result<String, DeliveryError> {
        serde_json::to_string(&WebhookPayload::from(message))
            .map_err(|e| DeliveryError::Encoding(e.to_string()))
    }
}

#[async_trait]
impl NotificationSink for PrintSink {
    async fn post(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        let line = Self::encode(message)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}").map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
