//! Outbound port traits implemented by infrastructure crates.
//!
//! [`crate::PipelineMetadataSource`] lives with the enrichment logic that uses
//! it; the delivery and time ports are here.

use async_trait::async_trait;

use crate::{DeliveryError, NotificationMessage, Timestamp};

/// Delivers a rendered notification to its destination.
///
/// A single best-effort attempt. Implementations must not retry; the
/// dispatcher logs a returned error and considers the dispatch complete.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn post(&self, message: &NotificationMessage) -> Result<(), DeliveryError>;
}

/// Source of the render timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
