//! Shared value types for the relay domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! display semantics: a [`SeverityTier`] maps to a fixed attachment color, a
//! [`Field`] knows whether it renders half-width, and a [`Timestamp`] knows how
//! to express itself as Unix seconds for the webhook payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Outcome category of a notification, mapped to the attachment bar color.
///
/// Pipeline and build events use the graded `Info`/`Success`/`Error` palette.
/// ECS task events use the binary `Run`/`Stop` palette, because a task is either
/// wanted running or wanted stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Info,
    Success,
    Error,
    Run,
    Stop,
}

impl SeverityTier {
    /// Returns the `#RRGGBB` color the destination renders for this tier.
    pub fn color_code(self) -> &'static str {
        match self {
            SeverityTier::Info => "#0174DF",
            SeverityTier::Success => "#32cd32",
            SeverityTier::Error => "#dc143c",
            SeverityTier::Run => "#ffa500",
            SeverityTier::Stop => "#808080",
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeverityTier::Info => "info",
            SeverityTier::Success => "success",
            SeverityTier::Error => "error",
            SeverityTier::Run => "run",
            SeverityTier::Stop => "stop",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One titled value in a notification attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// Half-width when `true`; the destination lays short fields out side by side.
    pub short: bool,
}

impl Field {
    /// Creates a half-width field.
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }

    /// Creates a full-width field.
    pub fn wide(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from whole Unix seconds.
    ///
    /// Returns `None` if `secs` is outside the range `chrono` can represent.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Returns whole seconds since the Unix epoch.
    pub fn unix_seconds(self) -> i64 {
        self.0.timestamp()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Rendered message
// ---------------------------------------------------------------------------

/// The fully rendered notification handed to a [`crate::NotificationSink`].
///
/// This is the only value that crosses from the domain into the delivery
/// adapter; the adapter decides the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Plain-text summary shown by clients that cannot render attachments.
    pub fallback_text: String,
    pub title_text: String,
    /// Deep link into the AWS console for the resource the event concerns.
    pub title_link: String,
    pub severity: SeverityTier,
    pub fields: Vec<Field>,
    pub footer_text: String,
    pub timestamp: Timestamp,
}

impl NotificationMessage {
    /// Returns the `#RRGGBB` attachment color for this message.
    pub fn color_code(&self) -> &'static str {
        self.severity.color_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_match_destination_palette() {
        assert_eq!(SeverityTier::Info.color_code(), "#0174DF");
        assert_eq!(SeverityTier::Success.color_code(), "#32cd32");
        assert_eq!(SeverityTier::Error.color_code(), "#dc143c");
        assert_eq!(SeverityTier::Run.color_code(), "#ffa500");
        assert_eq!(SeverityTier::Stop.color_code(), "#808080");
    }

    #[test]
    fn timestamp_round_trips_unix_seconds() {
        let ts = Timestamp::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(ts.unix_seconds(), 1_700_000_000);
    }
}
