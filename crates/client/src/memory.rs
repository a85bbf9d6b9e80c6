//! In-memory implementation of WorkflowService for testing

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::ServiceError;
use crate::service::WorkflowService;
use crate::types::{CreateRequest, GetRequest, Workflow, WorkflowPhase};

const GENERATED_SUFFIX_LEN: usize = 5;

struct StoredWorkflow {
    workflow: Workflow,
    /// Phases applied on successive reads, the last one sticks
    script: VecDeque<WorkflowPhase>,
}

/// In-memory implementation of [`WorkflowService`]
///
/// Stores workflows keyed by namespace and name and lets tests drive them
/// through phases. Reads can be scripted to advance the phase and to fail.
///
/// # Example
///
/// ```
/// use flowwait_client::{InMemoryWorkflowService, Workflow, WorkflowPhase};
///
/// let service = InMemoryWorkflowService::new();
/// service.insert(Workflow::new("default", "build").with_phase(WorkflowPhase::Running));
/// service.script_phases("default", "build", [WorkflowPhase::Succeeded]);
/// ```
#[derive(Default)]
pub struct InMemoryWorkflowService {
    workflows: Mutex<HashMap<(String, String), StoredWorkflow>>,
    get_failures: Mutex<VecDeque<ServiceError>>,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl InMemoryWorkflowService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a workflow as is, replacing any previous one with the same key
    pub fn insert(&self, workflow: Workflow) {
        let key = (
            workflow.metadata.namespace.clone(),
            workflow.metadata.name.clone(),
        );
        self.lock_workflows().insert(
            key,
            StoredWorkflow {
                workflow,
                script: VecDeque::new(),
            },
        );
    }

    /// Queue phases the workflow moves through on subsequent reads
    ///
    /// Each `get_workflow` applies the next queued phase before answering.
    /// Once the queue is drained the workflow keeps its last phase.
    pub fn script_phases(
        &self,
        namespace: &str,
        name: &str,
        phases: impl IntoIterator<Item = WorkflowPhase>,
    ) {
        let mut workflows = self.lock_workflows();
        if let Some(stored) = workflows.get_mut(&(namespace.to_string(), name.to_string())) {
            stored.script.extend(phases);
        }
    }

    /// Set the phase of a stored workflow immediately
    pub fn set_phase(&self, namespace: &str, name: &str, phase: WorkflowPhase) {
        let mut workflows = self.lock_workflows();
        if let Some(stored) = workflows.get_mut(&(namespace.to_string(), name.to_string())) {
            stored.workflow.status.phase = phase;
        }
    }

    /// Make the next `get_workflow` call fail with `error`
    ///
    /// Failures queue up and are consumed one per call.
    pub fn fail_next_get(&self, error: ServiceError) {
        self.get_failures.lock().push_back(error);
    }

    /// Current stored copy of a workflow
    pub fn workflow(&self, namespace: &str, name: &str) -> Option<Workflow> {
        self.lock_workflows()
            .get(&(namespace.to_string(), name.to_string()))
            .map(|stored| stored.workflow.clone())
    }

    pub fn workflow_count(&self) -> usize {
        self.lock_workflows().len()
    }

    /// Number of `get_workflow` calls served, failed ones included
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn lock_workflows(&self) -> MutexGuard<'_, HashMap<(String, String), StoredWorkflow>> {
        self.workflows.lock()
    }

    fn generate_name(prefix: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SUFFIX_LEN)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        format!("{prefix}{suffix}")
    }
}

#[async_trait]
impl WorkflowService for InMemoryWorkflowService {
    async fn create_workflow(&self, req: &CreateRequest) -> Result<Workflow, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut workflow = req.workflow.clone();
        if workflow.metadata.name.is_empty() {
            if workflow.metadata.generate_name.is_empty() {
                return Err(ServiceError::api(
                    400,
                    "workflow must set metadata.name or metadata.generateName",
                ));
            }
            workflow.metadata.name = Self::generate_name(&workflow.metadata.generate_name);
        }
        workflow.metadata.namespace = req.namespace.clone();
        workflow.status.phase = WorkflowPhase::Pending;

        let key = (req.namespace.clone(), workflow.metadata.name.clone());
        let mut workflows = self.lock_workflows();
        if workflows.contains_key(&key) {
            return Err(ServiceError::api(
                409,
                format!("workflow {}/{} already exists", key.0, key.1),
            ));
        }
        workflows.insert(
            key,
            StoredWorkflow {
                workflow: workflow.clone(),
                script: VecDeque::new(),
            },
        );

        Ok(workflow)
    }

    async fn get_workflow(&self, req: &GetRequest) -> Result<Workflow, ServiceError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.get_failures.lock().pop_front() {
            return Err(error);
        }

        let mut workflows = self.lock_workflows();
        let stored = workflows
            .get_mut(&(req.namespace.clone(), req.name.clone()))
            .ok_or_else(|| ServiceError::not_found(req))?;

        if let Some(phase) = stored.script.pop_front() {
            stored.workflow.status.phase = phase;
        }

        Ok(stored.workflow.clone())
    }
}
