//! Deploy notifier CodePipeline adapter.
//!
//! Implements [`relay::PipelineMetadataSource`] with `aws-sdk-codepipeline`.
//! Both calls are read-only (`GetPipelineExecution`, `GetPipeline`) and are
//! issued fresh for every event.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** SDK types, credentials and error metadata stay in this
//! crate. The [`relay`] crate sees only its own lookup result types.

use async_trait::async_trait;
use aws_sdk_codepipeline::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_codepipeline::types as sdk;
use relay::{
    ActionDeclaration, ArtifactRevision, EnrichmentError, ExecutionId, PipelineDefinition,
    PipelineExecution, PipelineMetadataSource, PipelineName, StageDeclaration,
};

/// CodePipeline-backed metadata lookups.
#[derive(Debug, Clone)]
pub struct CodePipelineMetadataSource {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineMetadataSource {
    pub fn new(client: aws_sdk_codepipeline::Client) -> Self {
        Self { client }
    }

    /// Builds a client from a shared AWS configuration.
    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_codepipeline::Client::new(config))
    }
}

#[async_trait]
impl PipelineMetadataSource for CodePipelineMetadataSource {
    async fn get_execution(
        &self,
        pipeline: &PipelineName,
        execution_id: &ExecutionId,
    ) -> Result<PipelineExecution, EnrichmentError> {
        const OPERATION: &str = "GetPipelineExecution";

        let output = self
            .client
            .get_pipeline_execution()
            .pipeline_name(pipeline.as_str())
            .pipeline_execution_id(execution_id.as_str())
            .send()
            .await
            .map_err(|e| lookup_error(OPERATION, &e))?;

        let execution = output
            .pipeline_execution()
            .ok_or_else(|| EnrichmentError::UnexpectedShape {
                operation: OPERATION,
                message: "response has no pipelineExecution".to_string(),
            })?;

        tracing::debug!(
            revisions = execution.artifact_revisions().len(),
            "Fetched pipeline execution"
        );
        Ok(execution_from_sdk(execution))
    }

    async fn get_definition(
        &self,
        pipeline: &PipelineName,
    ) -> Result<PipelineDefinition, EnrichmentError> {
        const OPERATION: &str = "GetPipeline";

        let output = self
            .client
            .get_pipeline()
            .name(pipeline.as_str())
            .send()
            .await
            .map_err(|e| lookup_error(OPERATION, &e))?;

        let declaration = output
            .pipeline()
            .ok_or_else(|| EnrichmentError::UnexpectedShape {
                operation: OPERATION,
                message: "response has no pipeline".to_string(),
            })?;

        tracing::debug!(
            stages = declaration.stages().len(),
            "Fetched pipeline definition"
        );
        Ok(definition_from_sdk(declaration))
    }
}

/// Prefers the service's error code and message; falls back to the full
/// error chain for transport and dispatch failures.
fn lookup_error<E>(operation: &'static str, error: &E) -> EnrichmentError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match (error.code(), error.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => DisplayErrorContext(error).to_string(),
    };
    EnrichmentError::Lookup { operation, message }
}

fn execution_from_sdk(execution: &sdk::PipelineExecution) -> PipelineExecution {
    PipelineExecution {
        artifact_revisions: execution
            .artifact_revisions()
            .iter()
            .map(|revision| ArtifactRevision {
                revision_id: revision.revision_id().map(str::to_string),
                revision_summary: revision.revision_summary().map(str::to_string),
                revision_url: revision.revision_url().map(str::to_string),
            })
            .collect(),
    }
}

fn definition_from_sdk(declaration: &sdk::PipelineDeclaration) -> PipelineDefinition {
    PipelineDefinition {
        stages: declaration
            .stages()
            .iter()
            .map(|stage| StageDeclaration {
                name: stage.name().to_string(),
                actions: stage
                    .actions()
                    .iter()
                    .map(|action| ActionDeclaration {
                        name: action.name().to_string(),
                        configuration: action
                            .configuration()
                            .map(|config| {
                                config
                                    .iter()
                                    .map(|(k, v)| (k.clone(), v.clone()))
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect(),
    }
}
