// Error types for the workflow client

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::types::GetRequest;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by a [`WorkflowService`](crate::WorkflowService) implementation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport or response decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("workflow not found: {namespace}/{name}")]
    NotFound { namespace: String, name: String },

    /// The service could not be reached
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(req: &GetRequest) -> Self {
        ServiceError::NotFound {
            namespace: req.namespace.clone(),
            name: req.name.clone(),
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        ServiceError::Unavailable(msg.into())
    }
}

/// Remote operation that produced a [`ClientError::Remote`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateWorkflow,
    GetWorkflow,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateWorkflow => f.write_str("create workflow"),
            Operation::GetWorkflow => f.write_str("get workflow"),
        }
    }
}

/// Errors returned by [`WorkflowClient`](crate::WorkflowClient)
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote call failed; `source` is exactly what the service returned
    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: ServiceError,
    },

    /// The wait was cancelled before completion was observed
    #[error("wait for workflow {namespace}/{name} cancelled")]
    Cancelled { namespace: String, name: String },

    /// The wait deadline elapsed before completion was observed
    #[error("wait for workflow {namespace}/{name} exceeded deadline of {timeout:?}")]
    DeadlineExceeded {
        namespace: String,
        name: String,
        timeout: Duration,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn remote(operation: Operation, source: ServiceError) -> Self {
        ClientError::Remote { operation, source }
    }

    pub fn cancelled(req: &GetRequest) -> Self {
        ClientError::Cancelled {
            namespace: req.namespace.clone(),
            name: req.name.clone(),
        }
    }

    pub fn deadline_exceeded(req: &GetRequest, timeout: Duration) -> Self {
        ClientError::DeadlineExceeded {
            namespace: req.namespace.clone(),
            name: req.name.clone(),
            timeout,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ClientError::Configuration(msg.into())
    }

    /// True for explicit cancellation and deadline expiry.
    ///
    /// A cancellation says nothing about the workflow itself, which may
    /// still be running on the server.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ClientError::Cancelled { .. } | ClientError::DeadlineExceeded { .. }
        )
    }

    /// The underlying service error, if this came from a remote call
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            ClientError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::Remote { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.service_error(), Some(ServiceError::NotFound { .. }))
    }
}
