// Submit command - create a workflow from a manifest, optionally waiting for it

use std::path::PathBuf;

use anyhow::Result;
use flowwait_client::{CancellationToken, CreateRequest, GetRequest, WorkflowClient};
use tracing::info;

use super::{ensure_succeeded, interruptible, read_manifest, wait_for};
use crate::output::{print_workflow, OutputFormat};

pub struct SubmitArgs {
    pub namespace: String,
    pub file: PathBuf,
    pub wait: bool,
    pub timeout: Option<u64>,
}

pub async fn run(
    client: &WorkflowClient,
    output: OutputFormat,
    quiet: bool,
    args: SubmitArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let manifest = interruptible(cancel, read_manifest(&args.file)).await?;
    let req = CreateRequest::new(&args.namespace, manifest);
    let created = interruptible(cancel, client.create_workflow(&req)).await?;

    info!(
        name = %created.name(),
        namespace = %created.namespace(),
        phase = %created.phase(),
        "Workflow submitted"
    );

    if !args.wait {
        return print_workflow(output, quiet, &created);
    }

    if !quiet && output.is_text() {
        eprintln!("Submitted {}, waiting for completion...", created.name());
    }

    let req = GetRequest::new(&args.namespace, created.name());
    let workflow = wait_for(client, &req, args.timeout, cancel).await?;
    print_workflow(output, quiet, &workflow)?;
    ensure_succeeded(&workflow)
}
