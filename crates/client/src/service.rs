// Remote workflow service abstraction
// Decision: The client only needs create and get; anything else stays on the concrete transport

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::types::{CreateRequest, GetRequest, Workflow};

/// The remote capabilities the client is built on.
///
/// Implementations must be safe to share across concurrent calls; the
/// client holds one behind an `Arc` and never synchronizes access.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Submit a workflow and return it as stored by the server
    async fn create_workflow(&self, req: &CreateRequest) -> Result<Workflow, ServiceError>;

    /// Fetch the current state of a workflow
    async fn get_workflow(&self, req: &GetRequest) -> Result<Workflow, ServiceError>;
}
