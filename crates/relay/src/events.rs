//! Inbound event envelope and typed per-source details.
//!
//! Events arrive as EventBridge envelopes whose `detail` object has a different
//! schema for every source. [`InboundEvent::parse`] converts the loosely-typed
//! envelope into an [`EventDetail`] variant once, at the dispatcher boundary,
//! so classifiers only ever see validated, strongly-typed data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    BuildNumber, ClusterName, ExecutionId, PipelineName, ProjectName, Region, RelayError,
    ServiceName, TaskDefinitionId,
};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The raw notification event as delivered by the trigger.
///
/// Envelope keys other than `region`, `source` and `detail` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub region: String,
    pub source: String,
    #[serde(default)]
    pub detail: Value,
}

/// The event sources the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// AWS CodePipeline stage execution state changes.
    Pipeline,
    /// AWS CodeBuild build state changes.
    Build,
    /// Amazon ECS task state changes.
    Orchestration,
}

impl EventSource {
    /// Resolves an envelope `source` string. Matching is exact.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "aws.codepipeline" => Some(Self::Pipeline),
            "aws.codebuild" => Some(Self::Build),
            "aws.ecs" => Some(Self::Orchestration),
            _ => None,
        }
    }

    /// The envelope `source` string for this source.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Pipeline => "aws.codepipeline",
            Self::Build => "aws.codebuild",
            Self::Orchestration => "aws.ecs",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

// ---------------------------------------------------------------------------
// Typed details
// ---------------------------------------------------------------------------

/// The execution, stage and state of a stage-scoped pipeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTransition {
    pub execution_id: ExecutionId,
    pub stage: String,
    pub state: String,
}

/// A CodePipeline execution state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStageDetail {
    pub pipeline: PipelineName,
    /// `None` for pipeline-level events, which carry no stage. Nothing else
    /// in the detail is required for those.
    pub transition: Option<StageTransition>,
}

/// A CodeBuild build state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStateDetail {
    pub project: ProjectName,
    pub build_number: BuildNumber,
    pub status: String,
}

/// An ECS task state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStateDetail {
    pub cluster: ClusterName,
    pub service: ServiceName,
    pub last_status: String,
    pub desired_status: String,
    pub task_definition: TaskDefinitionId,
}

/// A validated event detail, tagged by source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    Pipeline(PipelineStageDetail),
    Build(BuildStateDetail),
    Task(TaskStateDetail),
}

/// An inbound event from a known source whose detail passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub region: Region,
    pub detail: EventDetail,
}

// ---------------------------------------------------------------------------
// Raw wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawPipelineDetail {
    pipeline: String,
    #[serde(rename = "execution-id")]
    execution_id: Option<String>,
    stage: Option<String>,
    state: Option<String>,
}

#[derive(Deserialize)]
struct RawBuildDetail {
    #[serde(rename = "project-name")]
    project_name: String,
    #[serde(rename = "build-id")]
    build_id: String,
    #[serde(rename = "build-status")]
    build_status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskDetail {
    group: String,
    cluster_arn: String,
    last_status: String,
    desired_status: String,
    task_definition_arn: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl InboundEvent {
    /// Returns the recognised source of this event, if any.
    pub fn event_source(&self) -> Option<EventSource> {
        EventSource::from_identifier(&self.source)
    }

    /// Validates the envelope and converts `detail` into its typed form.
    ///
    /// Returns `Ok(None)` for sources the relay does not handle; those events
    /// are not an error. Known sources with missing or mistyped required
    /// fields yield [`RelayError::MalformedEvent`].
    pub fn parse(&self) -> Result<Option<ParsedEvent>, RelayError> {
        let Some(source) = self.event_source() else {
            return Ok(None);
        };
        let malformed = |reason: String| RelayError::MalformedEvent {
            source_name: source.identifier().to_string(),
            reason,
        };

        let region =
            Region::new(self.region.clone()).ok_or_else(|| malformed("empty region".into()))?;

        let detail = match source {
            EventSource::Pipeline => {
                let raw: RawPipelineDetail = decode(&self.detail).map_err(malformed)?;
                EventDetail::Pipeline(pipeline_detail(raw).map_err(malformed)?)
            }
            EventSource::Build => {
                let raw: RawBuildDetail = decode(&self.detail).map_err(malformed)?;
                EventDetail::Build(build_detail(raw).map_err(malformed)?)
            }
            EventSource::Orchestration => {
                let raw: RawTaskDetail = decode(&self.detail).map_err(malformed)?;
                EventDetail::Task(task_detail(raw).map_err(malformed)?)
            }
        };

        Ok(Some(ParsedEvent { region, detail }))
    }
}

fn decode<T: for<'de> Deserialize<'de>>(detail: &Value) -> Result<T, String> {
    T::deserialize(detail).map_err(|e| e.to_string())
}

fn pipeline_detail(raw: RawPipelineDetail) -> Result<PipelineStageDetail, String> {
    let pipeline = PipelineName::new(raw.pipeline).ok_or("empty `pipeline`")?;
    let Some(stage) = raw.stage else {
        return Ok(PipelineStageDetail {
            pipeline,
            transition: None,
        });
    };
    let state = raw
        .state
        .ok_or_else(|| format!("stage `{stage}` has no `state`"))?;
    let execution_id = raw
        .execution_id
        .and_then(ExecutionId::new)
        .ok_or_else(|| format!("stage `{stage}` has no `execution-id`"))?;
    Ok(PipelineStageDetail {
        pipeline,
        transition: Some(StageTransition {
            execution_id,
            stage,
            state,
        }),
    })
}

fn build_detail(raw: RawBuildDetail) -> Result<BuildStateDetail, String> {
    let project = ProjectName::new(raw.project_name).ok_or("empty `project-name`")?;
    let build_number =
        BuildNumber::new(last_segment(&raw.build_id, ':')).ok_or("empty `build-id`")?;
    Ok(BuildStateDetail {
        project,
        build_number,
        status: raw.build_status,
    })
}

fn task_detail(raw: RawTaskDetail) -> Result<TaskStateDetail, String> {
    let service = ServiceName::new(last_segment(&raw.group, ':')).ok_or("empty `group`")?;
    let cluster =
        ClusterName::new(last_segment(&raw.cluster_arn, '/')).ok_or("empty `clusterArn`")?;
    let task_definition = TaskDefinitionId::new(last_segment(&raw.task_definition_arn, '/'))
        .ok_or("empty `taskDefinitionArn`")?;
    Ok(TaskStateDetail {
        cluster,
        service,
        last_status: raw.last_status,
        desired_status: raw.desired_status,
        task_definition,
    })
}

/// Returns the text after the final `delimiter`, or all of `value` if absent.
fn last_segment(value: &str, delimiter: char) -> &str {
    value.rsplit(delimiter).next().unwrap_or(value)
}
