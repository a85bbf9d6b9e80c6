// Wait command - block until a workflow completes

use anyhow::Result;
use flowwait_client::{CancellationToken, GetRequest, WorkflowClient};
use tracing::info;

use super::{ensure_succeeded, wait_for};
use crate::output::{print_workflow, OutputFormat};

pub async fn run(
    client: &WorkflowClient,
    output: OutputFormat,
    quiet: bool,
    namespace: String,
    name: String,
    timeout: Option<u64>,
    cancel: &CancellationToken,
) -> Result<()> {
    let req = GetRequest::new(namespace, name);
    info!(workflow = %req, ?timeout, "Waiting for workflow");

    let workflow = wait_for(client, &req, timeout, cancel).await?;
    print_workflow(output, quiet, &workflow)?;
    ensure_succeeded(&workflow)
}
