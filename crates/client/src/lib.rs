//! # flowwait client
//!
//! A thin client for a remote workflow service (Argo Workflows) that adds a
//! blocking "wait until completed" operation on top of create and get.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                WorkflowClient                 │
//! │  create / get passthrough, wait polling loop  │
//! └───────────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌───────────────────────────────────────────────┐
//! │            dyn WorkflowService                │
//! │  ArgoServerService (HTTP)                     │
//! │  InMemoryWorkflowService (tests, local runs)  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use flowwait_client::prelude::*;
//!
//! let client = WorkflowClient::from_argo_server(
//!     ServerConfig::new("https://localhost:2746")?,
//!     ClientOptions::new(Duration::from_secs(2))?,
//! )?;
//!
//! let created = client.create_workflow(&CreateRequest::new("argo", manifest)).await?;
//! let done = client
//!     .wait_workflow_timeout(
//!         &GetRequest::new("argo", created.name()),
//!         Duration::from_secs(600),
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{} finished: {}", done.name(), done.phase());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod service;
pub mod types;

pub use client::WorkflowClient;
pub use config::{ClientOptions, ServerConfig};
pub use error::{ClientError, Operation, Result, ServiceError};
pub use http::ArgoServerService;
pub use memory::InMemoryWorkflowService;
pub use service::WorkflowService;
pub use types::{CreateRequest, GetRequest, ObjectMeta, Workflow, WorkflowPhase, WorkflowStatus};

pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::WorkflowClient;
    pub use crate::config::{ClientOptions, ServerConfig};
    pub use crate::error::{ClientError, ServiceError};
    pub use crate::service::WorkflowService;
    pub use crate::types::{CreateRequest, GetRequest, Workflow, WorkflowPhase};
    pub use tokio_util::sync::CancellationToken;
}
