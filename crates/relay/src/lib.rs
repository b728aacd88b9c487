//! Core domain for the deploy notifier.
//!
//! Receives CodePipeline, CodeBuild and ECS lifecycle events, decides per source
//! whether an event is worth a human's attention, and renders the survivors into
//! a chat attachment. Infrastructure crates implement the port traits defined
//! here; they never add filtering or rendering rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network I/O.
//! It defines *what* is needed; `codepipeline` and `webhook` supply *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype resource names (`PipelineName`, `ClusterName`, etc.) |
//! | [`types`] | Value types (`SeverityTier`, `Field`, `Timestamp`, `NotificationMessage`) |
//! | [`errors`] | Relay, enrichment and delivery error types |
//! | [`config`] | Runtime settings and the redacted webhook URL |
//! | [`events`] | Inbound envelope and typed per-source details |
//! | [`classifier`] | Per-source suppression and severity rules |
//! | [`enrichment`] | Pipeline branch/revision lookup and its port |
//! | [`renderer`] | Message assembly and console links |
//! | [`ports`] | Delivery and clock ports |
//! | [`dispatcher`] | The single entry point |
//! | [`fakes`] | In-memory port implementations for tests |

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod enrichment;
pub mod errors;
pub mod events;
pub mod fakes;
pub mod identifiers;
pub mod ports;
pub mod renderer;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classifier::{
    BuildClassifier, Classification, EventClassifier, PipelineClassifier, SuppressReason,
    TaskClassifier,
};
pub use config::{RelayConfig, WebhookUrl, DEFAULT_BUILD_NOTIFICATION_DELAY};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use enrichment::{
    ActionDeclaration, ArtifactRevision, EnrichmentData, EnrichmentResolver, PipelineDefinition,
    PipelineExecution, PipelineMetadataSource, RevisionInfo, StageDeclaration,
};
pub use errors::{DeliveryError, EnrichmentError, RelayError};
pub use events::{EventDetail, EventSource, InboundEvent, ParsedEvent};
pub use identifiers::{
    BranchName, BuildNumber, ClusterName, DispatchId, ExecutionId, PipelineName, ProjectName,
    Region, RevisionId, ServiceName, TaskDefinitionId,
};
pub use ports::{Clock, NotificationSink, SystemClock};
pub use renderer::{render, NotificationSubject, FOOTER_TEXT};
pub use types::{Field, NotificationMessage, SeverityTier, Timestamp};
