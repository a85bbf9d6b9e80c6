// Workflow commands

pub mod get;
pub mod submit;
pub mod wait;

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flowwait_client::{CancellationToken, GetRequest, Workflow, WorkflowClient, WorkflowPhase};
use tokio::io::AsyncReadExt;

/// Read a workflow manifest from a file, or stdin when the path is `-`
///
/// YAML and JSON are both accepted.
pub async fn read_manifest(path: &Path) -> Result<Workflow> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read manifest from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read manifest {}", path.display()))?
    };

    parse_manifest(&raw)
}

fn parse_manifest(raw: &str) -> Result<Workflow> {
    serde_yaml::from_str(raw).context("Invalid workflow manifest")
}

/// Run `fut` to completion unless `cancel` fires first
///
/// Server calls outside the wait loop have no cancellation of their own,
/// so this is what makes Ctrl-C stop a hung `get` or `submit`.
pub async fn interruptible<T, E>(
    cancel: &CancellationToken,
    fut: impl Future<Output = std::result::Result<T, E>>,
) -> Result<T>
where
    E: Into<anyhow::Error>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => bail!("Interrupted"),
        result = fut => result.map_err(Into::into),
    }
}

/// Wait for completion, bounded by `timeout` when given
pub async fn wait_for(
    client: &WorkflowClient,
    req: &GetRequest,
    timeout: Option<u64>,
    cancel: &CancellationToken,
) -> Result<Workflow> {
    let workflow = match timeout {
        Some(secs) => {
            client
                .wait_workflow_timeout(req, Duration::from_secs(secs), cancel)
                .await?
        }
        None => client.wait_workflow(req, cancel).await?,
    };
    Ok(workflow)
}

/// Turn a completed workflow into the command's exit status
pub fn ensure_succeeded(workflow: &Workflow) -> Result<()> {
    match workflow.phase() {
        WorkflowPhase::Succeeded => Ok(()),
        phase => bail!(
            "Workflow {}/{} finished with phase {}",
            workflow.namespace(),
            workflow.name(),
            phase
        ),
    }
}
