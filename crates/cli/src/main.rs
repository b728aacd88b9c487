//! Deploy notifier entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Wire observability**: install `tracing-subscriber` (and OTLP export
//!    when configured) via [`telemetry`].
//! 2. **Resolve configuration**: decrypt the webhook URL once via KMS; fail
//!    fast if that is impossible.
//! 3. **Construct infrastructure**: a [`codepipeline::CodePipelineMetadataSource`]
//!    and either a [`webhook::WebhookSink`] or, for `--dry-run`, a
//!    [`webhook::PrintSink`], injected into a [`relay::Dispatcher`].
//! 4. **Dispatch**: read one event envelope (file or stdin) and run it.
//!
//! Exit status is non-zero only for configuration errors and malformed input.
//! Suppressed events, unknown sources and failed deliveries exit normally.

mod config;
mod telemetry;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use relay::{
    DispatchOutcome, Dispatcher, InboundEvent, NotificationSink, RelayConfig, RelayError,
};
use webhook::{PrintSink, WebhookSink};

#[derive(Parser)]
#[command(name = "deploy-notifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Relay CodePipeline, CodeBuild and ECS events to a Slack webhook",
    long_about = None
)]
struct Cli {
    /// Event envelope JSON file (`-` reads stdin)
    #[arg(long, default_value = "-")]
    event: PathBuf,

    /// Base64 KMS ciphertext of the webhook URL
    #[arg(long, env = config::ENCRYPTED_WEBHOOK_ENV, hide_env_values = true)]
    encrypted_webhook_url: Option<String>,

    /// Seconds to wait before emitting a CodeBuild notification
    #[arg(long, env = "NOTIFIER_BUILD_DELAY_SECS", default_value_t = 5)]
    build_delay_secs: u64,

    /// Print the webhook payload to stdout instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.json)?;

    let result = run(cli).await;
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "Dispatch aborted");
    }

    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let sink: Arc<dyn NotificationSink> = if cli.dry_run {
        Arc::new(PrintSink)
    } else {
        let encrypted = cli.encrypted_webhook_url.as_deref().ok_or_else(|| {
            RelayError::configuration(format!("{} is not set", config::ENCRYPTED_WEBHOOK_ENV))
        })?;
        let kms = aws_sdk_kms::Client::new(&aws);
        let url = config::decrypt_webhook_url(&kms, encrypted).await?;
        Arc::new(WebhookSink::new(url)?)
    };

    let relay_config = RelayConfig {
        build_notification_delay: Duration::from_secs(cli.build_delay_secs),
    };
    let metadata = Arc::new(codepipeline::CodePipelineMetadataSource::from_conf(&aws));
    let dispatcher = Dispatcher::new(relay_config, metadata, sink);

    let event = read_event(&cli.event)?;
    match dispatcher.dispatch(&event).await? {
        DispatchOutcome::Ignored => tracing::info!(source = %event.source, "Event ignored"),
        DispatchOutcome::Suppressed(reason) => tracing::info!(%reason, "Event suppressed"),
        DispatchOutcome::Delivered => {}
        DispatchOutcome::DeliveryFailed(error) => {
            tracing::warn!(%error, "Dispatch completed without delivery")
        }
    }
    Ok(())
}

fn read_event(path: &Path) -> anyhow::Result<InboundEvent> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event from {}", path.display()))?
    };
    serde_json::from_str(&raw).context("event is not a valid EventBridge envelope")
}
