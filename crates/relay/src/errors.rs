//! Error types for the relay domain.
//!
//! [`RelayError`] covers the conditions a caller of the dispatcher must see:
//! malformed input and fatal configuration problems. Enrichment and delivery
//! failures have their own types because the dispatcher absorbs them; they are
//! logged and never propagate past [`crate::Dispatcher::dispatch`].

use thiserror::Error;

// ---------------------------------------------------------------------------
// Relay-level errors
// ---------------------------------------------------------------------------

/// Errors surfaced to the caller of the relay.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// An event from a known source is missing a required detail field, or a
    /// field has the wrong type.
    ///
    /// Produced by: detail parsing at the dispatcher boundary.
    #[error("Malformed {source_name} event: {reason}")]
    MalformedEvent {
        /// The event `source` identifier (e.g. `"aws.codebuild"`).
        source_name: String,
        /// Description of what was missing or invalid.
        reason: String,
    },

    /// The relay configuration is invalid or the webhook secret could not be
    /// obtained.
    ///
    /// Produced at startup; the relay never dispatches with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RelayError {
    /// Shorthand for a [`RelayError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment errors
// ---------------------------------------------------------------------------

/// A pipeline metadata lookup failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    /// The API call itself failed (network, throttling, access denied, not found).
    #[error("{operation} failed: {message}")]
    Lookup {
        /// API operation name, e.g. `"GetPipelineExecution"`.
        operation: &'static str,
        message: String,
    },

    /// The API answered but the response lacked data the relay relies on.
    #[error("{operation} returned an unexpected shape: {message}")]
    UnexpectedShape {
        operation: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// The webhook POST did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("Webhook request failed: {0}")]
    Transport(String),

    /// The webhook answered with a non-success status.
    #[error("Webhook rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The message could not be serialised into the webhook payload.
    #[error("Webhook payload could not be encoded: {0}")]
    Encoding(String),
}
