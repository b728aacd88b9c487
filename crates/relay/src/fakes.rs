//! In-memory fakes for the port traits (testing only).
//!
//! Provides [`StaticMetadataSource`], [`RecordingSink`] and [`FixedClock`],
//! which satisfy the port contracts without any network access.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::enrichment::{PipelineDefinition, PipelineExecution, PipelineMetadataSource};
use crate::ports::{Clock, NotificationSink};
use crate::{
    DeliveryError, EnrichmentError, ExecutionId, NotificationMessage, PipelineName, Timestamp,
};

// ---------------------------------------------------------------------------
// StaticMetadataSource
// ---------------------------------------------------------------------------

/// Answers every lookup with the same canned result and counts calls.
#[derive(Debug)]
pub struct StaticMetadataSource {
    execution: Result<PipelineExecution, EnrichmentError>,
    definition: Result<PipelineDefinition, EnrichmentError>,
    calls: Mutex<usize>,
}

impl StaticMetadataSource {
    pub fn new(execution: PipelineExecution, definition: PipelineDefinition) -> Self {
        Self {
            execution: Ok(execution),
            definition: Ok(definition),
            calls: Mutex::new(0),
        }
    }

    /// Execution lookups fail; definition lookups succeed.
    pub fn failing_execution(definition: PipelineDefinition) -> Self {
        Self {
            execution: Err(unavailable("GetPipelineExecution")),
            definition: Ok(definition),
            calls: Mutex::new(0),
        }
    }

    /// Every lookup fails.
    pub fn unavailable() -> Self {
        Self {
            execution: Err(unavailable("GetPipelineExecution")),
            definition: Err(unavailable("GetPipeline")),
            calls: Mutex::new(0),
        }
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn record_call(&self) {
        *self.calls.lock().unwrap() += 1;
    }
}

fn unavailable(operation: &'static str) -> EnrichmentError {
    EnrichmentError::Lookup {
        operation,
        message: "service unavailable".to_string(),
    }
}

#[async_trait]
impl PipelineMetadataSource for StaticMetadataSource {
    async fn get_execution(
        &self,
        _pipeline: &PipelineName,
        _execution_id: &ExecutionId,
    ) -> Result<PipelineExecution, EnrichmentError> {
        self.record_call();
        self.execution.clone()
    }

    async fn get_definition(
        &self,
        _pipeline: &PipelineName,
    ) -> Result<PipelineDefinition, EnrichmentError> {
        self.record_call();
        self.definition.clone()
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Stores every posted message; optionally rejects them all.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<NotificationMessage>>,
    reject_with: Option<DeliveryError>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records messages but reports every post as failed.
    pub fn rejecting(error: DeliveryError) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            reject_with: Some(error),
        }
    }

    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn post(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        self.messages.lock().unwrap().push(message.clone());
        match &self.reject_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// FixedClock
// ---------------------------------------------------------------------------

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
