//! Runtime configuration values.
//!
//! Configuration is resolved once at startup by the composition root and
//! passed in explicitly; nothing here reads the environment.

use std::time::Duration;

use crate::RelayError;

/// Default wait before a build notification is emitted.
pub const DEFAULT_BUILD_NOTIFICATION_DELAY: Duration = Duration::from_secs(5);

/// Settings that shape dispatch behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Wait applied before a build notification is emitted.
    ///
    /// CodeBuild can report a build before the pipeline's Source stage event
    /// has been posted; the wait makes the channel read in order most of the
    /// time. It is a heuristic, not an ordering guarantee.
    pub build_notification_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            build_notification_delay: DEFAULT_BUILD_NOTIFICATION_DELAY,
        }
    }
}

/// The decrypted incoming-webhook URL.
///
/// The URL embeds a bearer secret, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(String);

impl WebhookUrl {
    /// Validates a decrypted webhook URL.
    pub fn new(url: impl Into<String>) -> Result<Self, RelayError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(RelayError::configuration("webhook URL is empty"));
        }
        if !trimmed.starts_with("https://") && !trimmed.starts_with("http://") {
            return Err(RelayError::configuration(
                "webhook URL must be an http(s) URL",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookUrl(<redacted>)")
    }
}
