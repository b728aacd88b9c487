//! Builds the canonical [`NotificationMessage`] from classified event data.
//!
//! Rendering is a pure function: the timestamp is an input, so identical inputs
//! always yield an identical message. Console links reproduce the AWS console
//! URL layout exactly; region and resource names are inserted verbatim.

use crate::enrichment::EnrichmentData;
use crate::{
    BuildNumber, ClusterName, Field, NotificationMessage, PipelineName, ProjectName, Region,
    ServiceName, SeverityTier, Timestamp,
};

/// Footer attached to every message, identifying the relay as the sender.
pub const FOOTER_TEXT: &str = "send by ecs-codepipeline-notifier";

/// The resource a notification is about. Determines title, fallback and link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationSubject {
    Pipeline {
        region: Region,
        pipeline: PipelineName,
    },
    Build {
        region: Region,
        project: ProjectName,
        build_number: BuildNumber,
    },
    Service {
        region: Region,
        cluster: ClusterName,
        service: ServiceName,
    },
}

impl NotificationSubject {
    pub fn title(&self) -> String {
        match self {
            Self::Pipeline { pipeline, .. } => format!("AWS CodePipeline: {pipeline}"),
            Self::Build { project, .. } => {
                format!("AWS CodeBuild: {project}, Build Log (Click here)")
            }
            Self::Service {
                cluster, service, ..
            } => format!("Amazon ECS: {cluster}/{service}"),
        }
    }

    pub fn fallback(&self) -> &'static str {
        match self {
            Self::Pipeline { .. } => "AWS CodePipeline notification attachment",
            Self::Build { .. } => "AWS CodeBuild notification attachment",
            Self::Service { .. } => "ECS notification attachment",
        }
    }

    /// Deep link to the resource in the AWS console.
    pub fn console_link(&self) -> String {
        match self {
            Self::Pipeline { region, pipeline } => format!(
                "https://{region}.console.aws.amazon.com/codesuite/codepipeline/pipelines/{pipeline}/view"
            ),
            Self::Build {
                region,
                project,
                build_number,
            } => format!(
                "https://{region}.console.aws.amazon.com/codesuite/codebuild/projects/{project}/build/{project}%3A{build_number}/log"
            ),
            Self::Service {
                region,
                cluster,
                service,
            } => format!(
                "https://{region}.console.aws.amazon.com/ecs/home?region={region}#/clusters/{cluster}/services/{service}/details"
            ),
        }
    }
}

/// Assembles a message. Base fields come first, enrichment fields after.
pub fn render(
    subject: &NotificationSubject,
    severity: SeverityTier,
    base_fields: &[Field],
    enrichment: Option<&EnrichmentData>,
    timestamp: Timestamp,
) -> NotificationMessage {
    let mut fields = base_fields.to_vec();
    if let Some(enrichment) = enrichment {
        fields.extend(enrichment.fields());
    }

    NotificationMessage {
        fallback_text: subject.fallback().to_string(),
        title_text: subject.title(),
        title_link: subject.console_link(),
        severity,
        fields,
        footer_text: FOOTER_TEXT.to_string(),
        timestamp,
    }
}
