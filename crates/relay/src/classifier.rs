//! Per-source noise filtering and severity derivation.
//!
//! Each source has its own rules about which transitions deserve a human's
//! attention. The rules are expressed as one [`EventClassifier`] implementation
//! per source; the dispatcher selects the implementation by matching on
//! [`crate::EventDetail`], so no classifier ever inspects the source string.

use crate::events::{BuildStateDetail, PipelineStageDetail, TaskStateDetail};
use crate::{Field, SeverityTier};

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Why an event was not surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// Pipeline-level event with no stage information.
    NotStageScoped,
    /// A stage transition that happens on every run and carries no decision value.
    RoutineStageTransition { stage: String, state: String },
    /// Successful build; the pipeline's Build stage already reports it.
    BuildSucceeded,
    /// ECS task in an intermediate lifecycle state.
    TransientTaskStatus { last_status: String },
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuppressReason::NotStageScoped => f.write_str("pipeline event has no stage"),
            SuppressReason::RoutineStageTransition { stage, state } => {
                write!(f, "routine transition {stage}/{state}")
            }
            SuppressReason::BuildSucceeded => f.write_str("build succeeded"),
            SuppressReason::TransientTaskStatus { last_status } => {
                write!(f, "transient task status {last_status}")
            }
        }
    }
}

/// Outcome of classifying one event detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Suppressed(SuppressReason),
    /// The event should be surfaced with the given severity and base fields.
    Notify {
        severity: SeverityTier,
        fields: Vec<Field>,
    },
}

impl Classification {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Classification::Suppressed(_))
    }

    /// Severity of a passing event; `None` when suppressed.
    pub fn severity(&self) -> Option<SeverityTier> {
        match self {
            Classification::Notify { severity, .. } => Some(*severity),
            Classification::Suppressed(_) => None,
        }
    }

    /// Base fields of a passing event; empty when suppressed.
    pub fn fields(&self) -> &[Field] {
        match self {
            Classification::Notify { fields, .. } => fields,
            Classification::Suppressed(_) => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Decides whether an event is worth surfacing and how loudly.
///
/// Implementations are pure functions of the detail; they perform no I/O.
pub trait EventClassifier {
    /// The typed event detail this classifier understands.
    type Detail;

    fn classify(&self, detail: &Self::Detail) -> Classification;
}

// ---------------------------------------------------------------------------
// CodePipeline
// ---------------------------------------------------------------------------

/// `(stage, state)` pairs that fire on every run.
const ROUTINE_STAGE_TRANSITIONS: &[(&str, &str)] = &[
    ("Source", "SUCCEEDED"),
    ("Build", "STARTED"),
    ("Deploy", "STARTED"),
];

/// Rules for CodePipeline stage execution events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineClassifier;

impl EventClassifier for PipelineClassifier {
    type Detail = PipelineStageDetail;

    fn classify(&self, detail: &PipelineStageDetail) -> Classification {
        let Some(transition) = &detail.transition else {
            return Classification::Suppressed(SuppressReason::NotStageScoped);
        };
        let (stage, state) = (transition.stage.as_str(), transition.state.as_str());

        if ROUTINE_STAGE_TRANSITIONS.contains(&(stage, state)) {
            return Classification::Suppressed(SuppressReason::RoutineStageTransition {
                stage: stage.to_string(),
                state: state.to_string(),
            });
        }

        // Only the two benign states are special-cased; unknown states count as errors.
        let severity = match state {
            "STARTED" => SeverityTier::Info,
            "SUCCEEDED" => SeverityTier::Success,
            _ => SeverityTier::Error,
        };

        Classification::Notify {
            severity,
            fields: vec![Field::short("Stage", stage), Field::short("State", state)],
        }
    }
}

// ---------------------------------------------------------------------------
// CodeBuild
// ---------------------------------------------------------------------------

/// Rules for CodeBuild build state events.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildClassifier;

impl EventClassifier for BuildClassifier {
    type Detail = BuildStateDetail;

    fn classify(&self, detail: &BuildStateDetail) -> Classification {
        if detail.status == "SUCCEEDED" {
            return Classification::Suppressed(SuppressReason::BuildSucceeded);
        }

        let severity = if detail.status == "IN_PROGRESS" {
            SeverityTier::Info
        } else {
            SeverityTier::Error
        };

        Classification::Notify {
            severity,
            fields: vec![
                Field::short("Build Status", detail.status.as_str()),
                Field::short("Build ID", detail.build_number.as_str()),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// ECS
// ---------------------------------------------------------------------------

/// Intermediate task lifecycle states.
const TRANSIENT_TASK_STATUSES: &[&str] =
    &["DEPROVISIONING", "DEACTIVATING", "ACTIVATING", "PROVISIONING"];

/// Rules for ECS task state events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskClassifier;

impl EventClassifier for TaskClassifier {
    type Detail = TaskStateDetail;

    fn classify(&self, detail: &TaskStateDetail) -> Classification {
        if TRANSIENT_TASK_STATUSES.contains(&detail.last_status.as_str()) {
            return Classification::Suppressed(SuppressReason::TransientTaskStatus {
                last_status: detail.last_status.clone(),
            });
        }

        let severity = if detail.desired_status == "STOPPED" {
            SeverityTier::Stop
        } else {
            SeverityTier::Run
        };

        Classification::Notify {
            severity,
            fields: vec![
                Field::short("Last Status", detail.last_status.as_str()),
                Field::short("Desired Status", detail.desired_status.as_str()),
                Field::wide("ECS Task Definition", detail.task_definition.as_str()),
            ],
        }
    }
}
