//! cetokjob - create Kubernetes Jobs from CloudEvents

use std::sync::Arc;

use clap::Parser;
use kube::Client;

use cetok_common::telemetry::{init_telemetry, TelemetryConfig};
use cetok_job::{load_templates, JobGenerator, KubeJobSubmitter};
use cetok_receiver::{receiver_router, resolve_namespace, serve, Cli, ReceiverState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig::default())?;

    let templates = load_templates(&cli.paths)?;
    let namespace = resolve_namespace(cli.namespace.as_deref())?;

    let client = Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    let submitter = KubeJobSubmitter::new(client, namespace);
    tracing::info!(
        namespace = %submitter.namespace(),
        templates = templates.len(),
        "job generator ready"
    );

    let generator = Arc::new(JobGenerator::new(templates, Arc::new(submitter)));
    serve(cli.listen_addr(), receiver_router(ReceiverState::new(generator))).await?;

    Ok(())
}
