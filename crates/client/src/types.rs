// Workflow data model
// Decision: Only status.phase is interpreted, everything else is carried through opaquely
// Decision: Unknown phase strings fail to decode instead of mapping to a catch-all variant

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Execution phase reported by the workflow controller.
///
/// The set is closed. `Succeeded`, `Failed` and `Error` are terminal; the
/// rest mean the workflow is still in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowPhase {
    /// Not yet picked up by the controller (empty string on the wire)
    #[default]
    #[serde(rename = "")]
    Unknown,
    Pending,
    Running,
    Succeeded,
    Failed,
    Error,
}

impl WorkflowPhase {
    /// Every phase, in lifecycle order
    pub const ALL: [WorkflowPhase; 6] = [
        WorkflowPhase::Unknown,
        WorkflowPhase::Pending,
        WorkflowPhase::Running,
        WorkflowPhase::Succeeded,
        WorkflowPhase::Failed,
        WorkflowPhase::Error,
    ];

    /// Whether the phase is terminal
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            WorkflowPhase::Succeeded | WorkflowPhase::Failed | WorkflowPhase::Error
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowPhase::Unknown => "",
            WorkflowPhase::Pending => "Pending",
            WorkflowPhase::Running => "Running",
            WorkflowPhase::Succeeded => "Succeeded",
            WorkflowPhase::Failed => "Failed",
            WorkflowPhase::Error => "Error",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowPhase::Unknown => f.write_str("Unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Object metadata. Name and namespace are typed, the rest is passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Prefix the server appends a random suffix to when `name` is empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generate_name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Workflow status. Only the phase is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(default)]
    pub phase: WorkflowPhase,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowStatus {
    fn is_empty(&self) -> bool {
        self.phase == WorkflowPhase::Unknown && self.extra.is_empty()
    }
}

/// A workflow as owned by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,

    #[serde(default, skip_serializing_if = "WorkflowStatus::is_empty")]
    pub status: WorkflowStatus,

    /// apiVersion, kind and anything else at the top level
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// Create a workflow skeleton with the given name and namespace
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set the phase, builder style
    pub fn with_phase(mut self, phase: WorkflowPhase) -> Self {
        self.status.phase = phase;
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.status.phase
    }

    /// Shorthand for `self.phase().is_completed()`
    pub fn is_completed(&self) -> bool {
        self.status.phase.is_completed()
    }
}

/// Input to workflow creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub namespace: String,
    pub workflow: Workflow,
}

impl CreateRequest {
    pub fn new(namespace: impl Into<String>, workflow: Workflow) -> Self {
        Self {
            namespace: namespace.into(),
            workflow,
        }
    }
}

/// Identifies a single workflow instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetRequest {
    pub namespace: String,
    pub name: String,
}

impl GetRequest {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for GetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
