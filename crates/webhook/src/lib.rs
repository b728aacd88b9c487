//! Deploy notifier delivery adapter.
//!
//! Implements [`relay::NotificationSink`] for Slack incoming webhooks.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Wire format, HTTP transport and status handling live
//! here. The [`relay`] crate sees only [`relay::NotificationSink`] and hands
//! over a fully rendered [`relay::NotificationMessage`].
//!
//! - [`WebhookSink`] posts the message, one attempt, no retry.
//! - [`PrintSink`] prints the exact body instead, for dry runs.

pub mod client;
pub mod payload;
pub mod print;

pub use client::WebhookSink;
pub use payload::{Attachment, AttachmentField, WebhookPayload};
pub use print::PrintSink;
