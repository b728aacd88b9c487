//! Pipeline enrichment: branch and source revision lookup.
//!
//! Stage events only name the pipeline and execution. To tell a reader *what*
//! is being deployed, the resolver asks CodePipeline for the execution record
//! and the current pipeline definition. Both lookups go through the
//! [`PipelineMetadataSource`] port so the domain never depends on the AWS SDK.
//!
//! Lookups happen on every dispatch; nothing is cached, so the notification
//! reflects the pipeline as it is at dispatch time.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{BranchName, EnrichmentError, ExecutionId, Field, PipelineName, RevisionId};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Read-only access to CodePipeline metadata.
#[async_trait]
pub trait PipelineMetadataSource: Send + Sync {
    /// Fetches the execution record for one pipeline run.
    async fn get_execution(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<PipelineExecution, EnrichmentError>;

    /// Fetches the current definition of a pipeline.
    async fn get_definition(
        &self,
        pipeline: &PipelineName,
    ) -> Result<PipelineDefinition, EnrichmentError>;
}

// ---------------------------------------------------------------------------
// Lookup results
// ---------------------------------------------------------------------------

/// The subset of a pipeline execution record the relay reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineExecution {
    /// Source revisions that triggered the run. Empty for executions that were
    /// not started by a source change (e.g. manual release, retry).
    pub artifact_revisions: Vec<ArtifactRevision>,
}

/// A source revision attached to an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactRevision {
    pub revision_id: Option<String>,
    pub revision_summary: Option<String>,
    pub revision_url: Option<String>,
}

/// The subset of a pipeline definition the relay reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineDefinition {
    pub stages: Vec<StageDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageDeclaration {
    pub name: String,
    pub actions: Vec<ActionDeclaration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionDeclaration {
    pub name: String,
    pub configuration: BTreeMap<String, String>,
}

/// Source action configuration keys that carry the tracked branch.
///
/// GitHub (v1) actions use `Branch`; CodeCommit and CodeStar connection actions
/// use `BranchName`.
const BRANCH_CONFIGURATION_KEYS: &[&str] = &["Branch", "BranchName"];

impl PipelineDefinition {
    /// Returns the branch configured on the first action of the first stage.
    ///
    /// Pipelines are expected to open with a source stage holding exactly one
    /// source action. Anything else is reported as an error rather than guessed at.
    pub fn source_branch(&self) -> Result<BranchName, EnrichmentError> {
        let shape_error = |message: String| EnrichmentError::UnexpectedShape {
            operation: "GetPipeline",
            message,
        };

        let stage = self
            .stages
            .first()
            .ok_or_else(|| shape_error("pipeline has no stages".into()))?;
        let action = stage
            .actions
            .first()
            .ok_or_else(|| shape_error(format!("first stage `{}` has no actions", stage.name)))?;

        BRANCH_CONFIGURATION_KEYS
            .iter()
            .find_map(|key| action.configuration.get(*key))
            .and_then(|branch| BranchName::new(branch.as_str()))
            .ok_or_else(|| {
                shape_error(format!(
                    "action `{}` in stage `{}` has no branch configuration",
                    action.name, stage.name
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Enrichment data
// ---------------------------------------------------------------------------

/// Source revision details, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub summary: Option<String>,
    pub id: Option<RevisionId>,
    pub url: Option<String>,
}

impl From<&ArtifactRevision> for RevisionInfo {
    fn from(revision: &ArtifactRevision) -> Self {
        Self {
            summary: revision.revision_summary.clone(),
            id: revision.revision_id.as_deref().and_then(RevisionId::new),
            url: revision.revision_url.clone(),
        }
    }
}

/// Supplementary pipeline metadata appended to a notification.
///
/// Each part is independently optional: a failed definition lookup drops only
/// the branch, a failed or empty execution lookup drops only the revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentData {
    pub branch: Option<BranchName>,
    pub revision: Option<RevisionInfo>,
}

impl EnrichmentData {
    /// Renders the enrichment as notification fields, in display order.
    ///
    /// Absent data produces no field at all rather than an empty one.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();

        if let Some(branch) = &self.branch {
            fields.push(Field::wide("BranchName", branch.as_str()));
        }

        if let Some(revision) = &self.revision {
            let summary = match (&revision.summary, &revision.id) {
                (Some(summary), Some(id)) => Some(format!("{summary} : `{}`", id.short())),
                (Some(summary), None) => Some(summary.clone()),
                (None, Some(id)) => Some(format!("`{}`", id.short())),
                (None, None) => None,
            };
            if let Some(summary) = summary {
                fields.push(Field::wide("Revision Summary", summary));
            }
            if let Some(url) = revision.url.as_deref().filter(|u| !u.is_empty()) {
                fields.push(Field::wide("Revision URL", url));
            }
        }

        fields
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Performs the two enrichment lookups for a pipeline event.
pub struct EnrichmentResolver<'a> {
    source: &'a dyn PipelineMetadataSource,
}

impl<'a> EnrichmentResolver<'a> {
    pub fn new(source: &'a dyn PipelineMetadataSource) -> Self {
        Self { source }
    }

    /// Resolves branch and revision metadata.
    ///
    /// Never fails: each lookup error is logged and only the affected part of
    /// the enrichment is dropped.
    #[tracing::instrument(skip_all, fields(pipeline = %pipeline, execution_id = %execution_id))]
    pub async fn resolve(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> EnrichmentData {
        let revision = match self.source.get_execution(pipeline, execution_id).await {
            Ok(execution) => execution.artifact_revisions.first().map(RevisionInfo::from),
            Err(error) => {
                tracing::error!(%error, "Could not fetch pipeline execution; omitting revision");
                None
            }
        };

        let branch = match self.source.get_definition(pipeline).await {
            Ok(definition) => match definition.source_branch() {
                Ok(branch) => Some(branch),
                Err(error) => {
                    tracing::warn!(%error, "Pipeline source branch not found; omitting branch");
                    None
                }
            },
            Err(error) => {
                tracing::error!(%error, "Could not fetch pipeline definition; omitting branch");
                None
            }
        };

        EnrichmentData { branch, revision }
    }
}
