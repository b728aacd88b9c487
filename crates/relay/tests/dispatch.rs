//! End-to-end dispatch tests using the in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use relay::fakes::{FixedClock, RecordingSink, StaticMetadataSource};
use relay::{
    ActionDeclaration, ArtifactRevision, DeliveryError, DispatchOutcome, Dispatcher, Field,
    InboundEvent, PipelineDefinition, PipelineExecution, RelayConfig, RelayError, SeverityTier,
    StageDeclaration, SuppressReason, Timestamp,
};
use serde_json::{json, Value};

const NOW: i64 = 1_700_000_000;

fn config() -> RelayConfig {
    RelayConfig {
        build_notification_delay: Duration::ZERO,
    }
}

fn definition(branch: &str) -> PipelineDefinition {
    PipelineDefinition {
        stages: vec![StageDeclaration {
            name: "Source".into(),
            actions: vec![ActionDeclaration {
                name: "GitHub".into(),
                configuration: [("Branch".to_string(), branch.to_string())]
                    .into_iter()
                    .collect(),
            }],
        }],
    }
}

fn execution_with_revision() -> PipelineExecution {
    PipelineExecution {
        artifact_revisions: vec![ArtifactRevision {
            revision_id: Some("1234567890abcdef1234".into()),
            revision_summary: Some("Add health check".into()),
            revision_url: Some("https://github.com/acme/api/commit/1234567890".into()),
        }],
    }
}

struct Harness {
    dispatcher: Dispatcher,
    sink: Arc<RecordingSink>,
    metadata: Arc<StaticMetadataSource>,
}

fn harness_with(metadata: StaticMetadataSource, sink: RecordingSink) -> Harness {
    let metadata = Arc::new(metadata);
    let sink = Arc::new(sink);
    let clock = FixedClock(Timestamp::from_unix_seconds(NOW).unwrap());
    let dispatcher = Dispatcher::new(config(), metadata.clone(), sink.clone())
        .with_clock(Arc::new(clock));
    Harness {
        dispatcher,
        sink,
        metadata,
    }
}

fn harness(execution: PipelineExecution) -> Harness {
    harness_with(
        StaticMetadataSource::new(execution, definition("main")),
        RecordingSink::new(),
    )
}

fn event(source: &str, detail: Value) -> InboundEvent {
    InboundEvent {
        region: "us-west-2".into(),
        source: source.into(),
        detail,
    }
}

fn pipeline_event(stage: &str, state: &str) -> InboundEvent {
    event(
        "aws.codepipeline",
        json!({"pipeline": "api", "execution-id": "exec-1", "stage": stage, "state": state}),
    )
}

#[tokio::test]
async fn failed_deploy_is_enriched_and_delivered() {
    let h = harness(execution_with_revision());

    let outcome = h
        .dispatcher
        .dispatch(&pipeline_event("Deploy", "FAILED"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Delivered);
    let messages = h.sink.messages();
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.severity, SeverityTier::Error);
    assert_eq!(message.title_text, "AWS CodePipeline: api");
    assert_eq!(
        message.title_link,
        "https://us-west-2.console.aws.amazon.com/codesuite/codepipeline/pipelines/api/view"
    );
    assert_eq!(
        message.fields,
        vec![
            Field::short("Stage", "Deploy"),
            Field::short("State", "FAILED"),
            Field::wide("BranchName", "main"),
            Field::wide("Revision Summary", "Add health check : `12345678`"),
            Field::wide("Revision URL", "https://github.com/acme/api/commit/1234567890"),
        ]
    );
    assert_eq!(message.timestamp.unix_seconds(), NOW);
    assert_eq!(h.metadata.calls(), 2);
}

#[tokio::test]
async fn empty_revisions_and_missing_branch_leave_only_base_fields() {
    let h = harness_with(
        StaticMetadataSource::new(PipelineExecution::default(), PipelineDefinition::default()),
        RecordingSink::new(),
    );

    h.dispatcher
        .dispatch(&pipeline_event("Build", "FAILED"))
        .await
        .unwrap();

    let fields = &h.sink.messages()[0].fields;
    assert_eq!(
        fields,
        &vec![Field::short("Stage", "Build"), Field::short("State", "FAILED")]
    );
}

#[tokio::test]
async fn suppressed_pipeline_events_skip_enrichment() {
    let h = harness(execution_with_revision());

    let outcome = h
        .dispatcher
        .dispatch(&pipeline_event("Source", "SUCCEEDED"))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        DispatchOutcome::Suppressed(SuppressReason::RoutineStageTransition { .. })
    ));
    assert!(h.sink.messages().is_empty());
    assert_eq!(h.metadata.calls(), 0);
}

#[tokio::test]
async fn pipeline_level_events_are_suppressed() {
    let h = harness(execution_with_revision());
    let outcome = h
        .dispatcher
        .dispatch(&event(
            "aws.codepipeline",
            json!({"pipeline": "api", "execution-id": "exec-1", "state": "FAILED"}),
        ))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Suppressed(SuppressReason::NotStageScoped)
    );
}

#[tokio::test]
async fn pipeline_level_event_without_execution_id_is_suppressed() {
    let h = harness(execution_with_revision());
    let outcome = h
        .dispatcher
        .dispatch(&event(
            "aws.codepipeline",
            json!({"pipeline": "api", "state": "STARTED"}),
        ))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Suppressed(SuppressReason::NotStageScoped)
    );
    assert_eq!(h.metadata.calls(), 0);
}

#[tokio::test]
async fn enrichment_outage_still_delivers_base_fields() {
    let h = harness_with(StaticMetadataSource::unavailable(), RecordingSink::new());

    let outcome = h
        .dispatcher
        .dispatch(&pipeline_event("Deploy", "SUCCEEDED"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Delivered);
    let message = &h.sink.messages()[0];
    assert_eq!(message.severity, SeverityTier::Success);
    assert_eq!(message.fields.len(), 2);
}

#[tokio::test]
async fn in_progress_build_is_info_with_numeric_id() {
    let h = harness(PipelineExecution::default());

    let outcome = h
        .dispatcher
        .dispatch(&event(
            "aws.codebuild",
            json!({"project-name": "proj", "build-id": "proj:42", "build-status": "IN_PROGRESS"}),
        ))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Delivered);
    let message = &h.sink.messages()[0];
    assert_eq!(message.severity, SeverityTier::Info);
    assert_eq!(message.fields[1], Field::short("Build ID", "42"));
    assert_eq!(
        message.title_link,
        "https://us-west-2.console.aws.amazon.com/codesuite/codebuild/projects/proj/build/proj%3A42/log"
    );
    assert_eq!(h.metadata.calls(), 0);
}

#[tokio::test]
async fn succeeded_build_is_not_reported() {
    let h = harness(PipelineExecution::default());
    let outcome = h
        .dispatcher
        .dispatch(&event(
            "aws.codebuild",
            json!({"project-name": "proj", "build-id": "proj:43", "build-status": "SUCCEEDED"}),
        ))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        DispatchOutcome::Suppressed(SuppressReason::BuildSucceeded)
    );
    assert!(h.sink.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn build_notification_waits_for_configured_delay() {
    let metadata = Arc::new(StaticMetadataSource::new(
        PipelineExecution::default(),
        definition("main"),
    ));
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = Dispatcher::new(
        RelayConfig {
            build_notification_delay: Duration::from_secs(5),
        },
        metadata,
        sink.clone(),
    );

    let started = tokio::time::Instant::now();
    dispatcher
        .dispatch(&event(
            "aws.codebuild",
            json!({"project-name": "proj", "build-id": "proj:44", "build-status": "FAILED"}),
        ))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn build_delay_does_not_hold_pipeline_or_task_notifications() {
    let metadata = Arc::new(StaticMetadataSource::new(
        execution_with_revision(),
        definition("main"),
    ));
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = Dispatcher::new(
        RelayConfig {
            build_notification_delay: Duration::from_secs(5),
        },
        metadata,
        sink.clone(),
    );

    let started = tokio::time::Instant::now();
    let outcome = dispatcher
        .dispatch(&pipeline_event("Deploy", "FAILED"))
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Delivered);
    assert_eq!(started.elapsed(), Duration::ZERO);

    let started = tokio::time::Instant::now();
    let outcome = dispatcher
        .dispatch(&event(
            "aws.ecs",
            json!({
                "group": "service:web",
                "clusterArn": "arn:aws:ecs:us-west-2:123456789012:cluster/prod",
                "lastStatus": "RUNNING",
                "desiredStatus": "RUNNING",
                "taskDefinitionArn": "arn:aws:ecs:us-west-2:123456789012:task-definition/web:7"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Delivered);
    assert_eq!(started.elapsed(), Duration::ZERO);

    assert_eq!(sink.messages().len(), 2);
}

#[tokio::test]
async fn stopping_task_uses_stop_color() {
    let h = harness(PipelineExecution::default());

    h.dispatcher
        .dispatch(&event(
            "aws.ecs",
            json!({
                "group": "service:web",
                "clusterArn": "arn:aws:ecs:us-west-2:123456789012:cluster/prod",
                "lastStatus": "RUNNING",
                "desiredStatus": "STOPPED",
                "taskDefinitionArn": "arn:aws:ecs:us-west-2:123456789012:task-definition/web:7"
            }),
        ))
        .await
        .unwrap();

    let message = &h.sink.messages()[0];
    assert_eq!(message.severity, SeverityTier::Stop);
    assert_eq!(message.color_code(), "#808080");
    assert_eq!(message.title_text, "Amazon ECS: prod/web");
    assert_eq!(
        message.fields[2],
        Field::wide("ECS Task Definition", "web:7")
    );
}

#[tokio::test]
async fn transient_task_status_is_suppressed() {
    let h = harness(PipelineExecution::default());
    let outcome = h
        .dispatcher
        .dispatch(&event(
            "aws.ecs",
            json!({
                "group": "service:web",
                "clusterArn": "arn:aws:ecs:us-west-2:123456789012:cluster/prod",
                "lastStatus": "PROVISIONING",
                "desiredStatus": "RUNNING",
                "taskDefinitionArn": "arn:aws:ecs:us-west-2:123456789012:task-definition/web:7"
            }),
        ))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Suppressed(SuppressReason::TransientTaskStatus { .. })
    ));
}

#[tokio::test]
async fn unknown_sources_are_ignored_silently() {
    let h = harness(PipelineExecution::default());
    let outcome = h
        .dispatcher
        .dispatch(&event("aws.s3", json!({"anything": true})))
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert!(h.sink.messages().is_empty());
}

#[tokio::test]
async fn malformed_known_source_is_an_error() {
    let h = harness(PipelineExecution::default());
    let err = h
        .dispatcher
        .dispatch(&event("aws.codebuild", json!({"project-name": "proj"})))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::MalformedEvent { .. }));
    assert!(h.sink.messages().is_empty());
}

#[tokio::test]
async fn delivery_failure_completes_the_dispatch() {
    let rejection = DeliveryError::Rejected {
        status: 404,
        body: "no_service".into(),
    };
    let h = harness_with(
        StaticMetadataSource::new(PipelineExecution::default(), definition("main")),
        RecordingSink::rejecting(rejection.clone()),
    );

    let outcome = h
        .dispatcher
        .dispatch(&pipeline_event("Deploy", "FAILED"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::DeliveryFailed(rejection));
}
