// Workflow client
// Decision: create/get are passthroughs; the only added behavior is the wait loop
// Decision: Fixed-interval polling, first check one interval after entry
// Decision: No retry of failed status queries, the first failure ends the wait
//
// Wait states:
// - Waiting: ticker armed, racing the cancellation token
// - Completed: a poll observed a completed phase
// - QueryFailed: a poll returned an error
// - Cancelled: the token fired or the deadline elapsed

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{ClientOptions, ServerConfig};
use crate::error::{ClientError, Operation, Result};
use crate::http::ArgoServerService;
use crate::service::WorkflowService;
use crate::types::{CreateRequest, GetRequest, Workflow};

/// Client for creating workflows and waiting on their completion
///
/// Cloning is cheap; clones share the underlying service handle.
#[derive(Clone)]
pub struct WorkflowClient {
    service: Arc<dyn WorkflowService>,
    options: ClientOptions,
}

impl WorkflowClient {
    pub fn new(service: Arc<dyn WorkflowService>, options: ClientOptions) -> Self {
        Self { service, options }
    }

    /// Create a client talking to an Argo server over HTTP
    pub fn from_argo_server(config: ServerConfig, options: ClientOptions) -> Result<Self> {
        info!(url = %config.url, "Connecting to Argo server");
        let service = ArgoServerService::new(config)?;
        Ok(Self::new(Arc::new(service), options))
    }

    /// The underlying service handle
    pub fn service(&self) -> Arc<dyn WorkflowService> {
        Arc::clone(&self.service)
    }

    pub fn polling_interval(&self) -> Duration {
        self.options.polling_interval()
    }

    /// Submit a workflow. The server's response is returned as is.
    pub async fn create_workflow(&self, req: &CreateRequest) -> Result<Workflow> {
        self.service
            .create_workflow(req)
            .await
            .map_err(|e| ClientError::remote(Operation::CreateWorkflow, e))
    }

    /// Fetch the current state of a workflow. Nothing is cached.
    pub async fn get_workflow(&self, req: &GetRequest) -> Result<Workflow> {
        self.service
            .get_workflow(req)
            .await
            .map_err(|e| ClientError::remote(Operation::GetWorkflow, e))
    }

    /// Poll until the workflow reaches a completed phase.
    ///
    /// The first status check happens one polling interval after the call,
    /// then once per interval. Returns the first workflow observed in a
    /// completed phase, the first query error, or [`ClientError::Cancelled`]
    /// as soon as `cancel` fires, including while a query is in flight.
    ///
    /// A completed phase is not necessarily a successful one; check
    /// [`Workflow::phase`] on the result.
    #[instrument(skip(self, req, cancel), fields(workflow = %req))]
    pub async fn wait_workflow(
        &self,
        req: &GetRequest,
        cancel: &CancellationToken,
    ) -> Result<Workflow> {
        let interval = self.options.polling_interval();
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut polls: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(polls, "Wait cancelled");
                    return Err(ClientError::cancelled(req));
                }
                _ = ticker.tick() => {}
            }

            polls += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(polls, "Wait cancelled during status query");
                    return Err(ClientError::cancelled(req));
                }
                result = self.get_workflow(req) => result,
            };

            let workflow = match result {
                Ok(workflow) => workflow,
                Err(e) => {
                    warn!(polls, error = %e, "Status query failed, giving up");
                    return Err(e);
                }
            };

            if workflow.is_completed() {
                info!(polls, phase = %workflow.phase(), "Workflow completed");
                return Ok(workflow);
            }

            debug!(polls, phase = %workflow.phase(), "Workflow still in progress");
        }
    }

    /// [`wait_workflow`](Self::wait_workflow) bounded by a deadline.
    ///
    /// Returns [`ClientError::DeadlineExceeded`] if `timeout` elapses
    /// before completion is observed. An in-flight query is dropped.
    pub async fn wait_workflow_timeout(
        &self,
        req: &GetRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Workflow> {
        match time::timeout(timeout, self.wait_workflow(req, cancel)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(workflow = %req, ?timeout, "Wait deadline exceeded");
                Err(ClientError::deadline_exceeded(req, timeout))
            }
        }
    }
}
