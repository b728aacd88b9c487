//! Single entry point: routes one inbound event through classification,
//! enrichment, rendering and delivery.
//!
//! A dispatch is a strictly sequential chain. The only awaits are the two
//! enrichment lookups, the optional build delay, and the delivery POST.
//! Enrichment and delivery failures are logged and absorbed; only malformed
//! input from a known source is returned to the caller.

use std::sync::Arc;

use crate::classifier::{
    BuildClassifier, Classification, EventClassifier, PipelineClassifier, SuppressReason,
    TaskClassifier,
};
use crate::enrichment::{EnrichmentResolver, PipelineMetadataSource};
use crate::events::{BuildStateDetail, EventDetail, InboundEvent, PipelineStageDetail, TaskStateDetail};
use crate::ports::{Clock, NotificationSink, SystemClock};
use crate::renderer::{render, NotificationSubject};
use crate::{DeliveryError, DispatchId, Region, RelayConfig, RelayError};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The source is not one the relay handles.
    Ignored,
    /// The event was classified as noise.
    Suppressed(SuppressReason),
    /// The notification was accepted by the sink.
    Delivered,
    /// The notification was rendered but the sink rejected it.
    DeliveryFailed(DeliveryError),
}

/// Routes events to the matching classifier and forwards notifications.
pub struct Dispatcher {
    config: RelayConfig,
    metadata: Arc<dyn PipelineMetadataSource>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(
        config: RelayConfig,
        metadata: Arc<dyn PipelineMetadataSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            metadata,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the wall clock used to stamp messages.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Processes one event.
    ///
    /// # Errors
    ///
    /// [`RelayError::MalformedEvent`] when an event from a known source lacks a
    /// required field. Unknown sources, enrichment failures and delivery
    /// failures are not errors.
    #[tracing::instrument(
        skip_all,
        fields(dispatch_id = %DispatchId::new_random(), source = %event.source, region = %event.region)
    )]
    pub async fn dispatch(&self, event: &InboundEvent) -> Result<DispatchOutcome, RelayError> {
        tracing::debug!(
            event = %serde_json::to_string(event).unwrap_or_default(),
            "Received event"
        );

        let Some(parsed) = event.parse()? else {
            tracing::debug!("Ignoring event from unhandled source");
            return Ok(DispatchOutcome::Ignored);
        };

        let outcome = match &parsed.detail {
            EventDetail::Pipeline(detail) => self.dispatch_pipeline(&parsed.region, detail).await,
            EventDetail::Build(detail) => self.dispatch_build(&parsed.region, detail).await,
            EventDetail::Task(detail) => self.dispatch_task(&parsed.region, detail).await,
        };
        Ok(outcome)
    }

    async fn dispatch_pipeline(
        &self,
        region: &Region,
        detail: &PipelineStageDetail,
    ) -> DispatchOutcome {
        let (severity, fields) = match PipelineClassifier.classify(detail) {
            Classification::Suppressed(reason) => return suppressed(reason),
            Classification::Notify { severity, fields } => (severity, fields),
        };
        let Some(transition) = &detail.transition else {
            return suppressed(SuppressReason::NotStageScoped);
        };

        let enrichment = EnrichmentResolver::new(self.metadata.as_ref())
            .resolve(&detail.pipeline, &transition.execution_id)
            .await;

        let subject = NotificationSubject::Pipeline {
            region: region.clone(),
            pipeline: detail.pipeline.clone(),
        };
        let message = render(&subject, severity, &fields, Some(&enrichment), self.clock.now());
        self.deliver(&message).await
    }

    async fn dispatch_build(&self, region: &Region, detail: &BuildStateDetail) -> DispatchOutcome {
        let (severity, fields) = match BuildClassifier.classify(detail) {
            Classification::Suppressed(reason) => return suppressed(reason),
            Classification::Notify { severity, fields } => (severity, fields),
        };

        let delay = self.config.build_notification_delay;
        if !delay.is_zero() {
            tracing::debug!(?delay, "Delaying build notification");
            tokio::time::sleep(delay).await;
        }

        let subject = NotificationSubject::Build {
            region: region.clone(),
            project: detail.project.clone(),
            build_number: detail.build_number.clone(),
        };
        let message = render(&subject, severity, &fields, None, self.clock.now());
        self.deliver(&message).await
    }

    async fn dispatch_task(&self, region: &Region, detail: &TaskStateDetail) -> DispatchOutcome {
        let (severity, fields) = match TaskClassifier.classify(detail) {
            Classification::Suppressed(reason) => return suppressed(reason),
            Classification::Notify { severity, fields } => (severity, fields),
        };

        let subject = NotificationSubject::Service {
            region: region.clone(),
            cluster: detail.cluster.clone(),
            service: detail.service.clone(),
        };
        let message = render(&subject, severity, &fields, None, self.clock.now());
        self.deliver(&message).await
    }

    async fn deliver(&self, message: &crate::NotificationMessage) -> DispatchOutcome {
        match self.sink.post(message).await {
            Ok(()) => {
                tracing::info!(
                    title = %message.title_text,
                    severity = %message.severity,
                    "Notification delivered"
                );
                DispatchOutcome::Delivered
            }
            Err(error) => {
                tracing::error!(%error, title = %message.title_text, "Notification delivery failed");
                DispatchOutcome::DeliveryFailed(error)
            }
        }
    }
}

fn suppressed(reason: SuppressReason) -> DispatchOutcome {
    tracing::debug!(%reason, "Event suppressed");
    DispatchOutcome::Suppressed(reason)
}
