// Get command - print the current state of a workflow

use anyhow::Result;
use flowwait_client::{CancellationToken, GetRequest, WorkflowClient};

use super::interruptible;
use crate::output::{print_workflow, OutputFormat};

pub async fn run(
    client: &WorkflowClient,
    output: OutputFormat,
    quiet: bool,
    namespace: String,
    name: String,
    cancel: &CancellationToken,
) -> Result<()> {
    let req = GetRequest::new(namespace, name);
    let workflow = interruptible(cancel, client.get_workflow(&req)).await?;
    print_workflow(output, quiet, &workflow)
}
