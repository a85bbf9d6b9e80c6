// Wait loop behavior against in-process services, on a paused clock

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flowwait_client::prelude::*;
use flowwait_client::{InMemoryWorkflowService, Operation};
use tokio::time::{self, Instant};

const INTERVAL: Duration = Duration::from_millis(100);

fn client(service: Arc<dyn WorkflowService>) -> WorkflowClient {
    WorkflowClient::new(service, ClientOptions::new(INTERVAL).unwrap())
}

fn seeded(phase: WorkflowPhase) -> Arc<InMemoryWorkflowService> {
    let service = Arc::new(InMemoryWorkflowService::new());
    service.insert(Workflow::new("default", "test-workflow-00").with_phase(phase));
    service
}

fn request() -> GetRequest {
    GetRequest::new("default", "test-workflow-00")
}

/// Service whose reads take a long time, to cancel them mid-flight
struct SlowService {
    delay: Duration,
    started: AtomicUsize,
    finished: AtomicUsize,
}

#[async_trait]
impl WorkflowService for SlowService {
    async fn create_workflow(&self, req: &CreateRequest) -> Result<Workflow, ServiceError> {
        Ok(req.workflow.clone())
    }

    async fn get_workflow(&self, req: &GetRequest) -> Result<Workflow, ServiceError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(Workflow::new(&req.namespace, &req.name).with_phase(WorkflowPhase::Succeeded))
    }
}

#[tokio::test(start_paused = true)]
async fn test_succeeded_returns_after_one_interval() {
    let service = seeded(WorkflowPhase::Succeeded);
    let client = client(service.clone());
    let start = Instant::now();

    let wf = client
        .wait_workflow(&request(), &CancellationToken::new())
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= INTERVAL && elapsed < INTERVAL * 2, "{elapsed:?}");
    assert_eq!(wf.name(), "test-workflow-00");
    assert_eq!(wf.namespace(), "default");
    assert_eq!(wf.phase(), WorkflowPhase::Succeeded);
    assert_eq!(service.get_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pending_until_deadline() {
    let service = seeded(WorkflowPhase::Pending);
    let client = client(service.clone());
    let start = Instant::now();

    let err = client
        .wait_workflow_timeout(&request(), Duration::from_secs(1), &CancellationToken::new())
        .await
        .unwrap_err();

    let elapsed = start.elapsed();
    assert!(matches!(err, ClientError::DeadlineExceeded { .. }), "{err}");
    assert!(err.is_cancellation());
    assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(1) + INTERVAL);
    // The workflow itself is untouched by the abandoned wait
    assert_eq!(
        service.workflow("default", "test-workflow-00").unwrap().phase(),
        WorkflowPhase::Pending
    );
}

#[tokio::test(start_paused = true)]
async fn test_pending_then_succeeded() {
    let service = seeded(WorkflowPhase::Pending);
    service.script_phases(
        "default",
        "test-workflow-00",
        [WorkflowPhase::Pending, WorkflowPhase::Succeeded],
    );
    let client = client(service.clone());
    let start = Instant::now();

    let wf = client
        .wait_workflow_timeout(&request(), Duration::from_secs(1), &CancellationToken::new())
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert_eq!(wf.phase(), WorkflowPhase::Succeeded);
    assert!(elapsed >= INTERVAL * 2 && elapsed < INTERVAL * 3, "{elapsed:?}");
    assert_eq!(service.get_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_on_first_poll() {
    let service = seeded(WorkflowPhase::Running);
    service.fail_next_get(ServiceError::unavailable("connection refused"));
    let client = client(service.clone());
    let start = Instant::now();

    let err = client
        .wait_workflow_timeout(&request(), Duration::from_secs(1), &CancellationToken::new())
        .await
        .unwrap_err();

    let elapsed = start.elapsed();
    assert!(elapsed >= INTERVAL && elapsed < INTERVAL * 2, "{elapsed:?}");
    assert!(!err.is_cancellation());
    assert_eq!(err.operation(), Some(Operation::GetWorkflow));
    assert!(matches!(
        err.service_error(),
        Some(ServiceError::Unavailable(msg)) if msg == "connection refused"
    ));

    // No second poll, even with time to spare
    time::sleep(INTERVAL * 5).await;
    assert_eq!(service.get_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_and_error_phases_complete_the_wait() {
    for phase in [WorkflowPhase::Failed, WorkflowPhase::Error] {
        let service = seeded(WorkflowPhase::Running);
        service.script_phases("default", "test-workflow-00", [WorkflowPhase::Running, phase]);
        let client = client(service.clone());

        let wf = client
            .wait_workflow(&request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(wf.phase(), phase);
        assert_eq!(service.get_calls(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_explicit_cancel_stops_polling() {
    let service = seeded(WorkflowPhase::Running);
    let client = client(service.clone());
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(350)).await;
            cancel.cancel();
        })
    };

    let start = Instant::now();
    let err = client.wait_workflow(&request(), &cancel).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, ClientError::Cancelled { .. }), "{err}");
    assert_eq!(start.elapsed(), Duration::from_millis(350));
    assert_eq!(service.get_calls(), 3);

    time::sleep(INTERVAL * 5).await;
    assert_eq!(service.get_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_inflight_query() {
    let service = Arc::new(SlowService {
        delay: Duration::from_secs(30),
        started: AtomicUsize::new(0),
        finished: AtomicUsize::new(0),
    });
    let client = client(service.clone());
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(250)).await;
            cancel.cancel();
        })
    };

    let start = Instant::now();
    let err = client.wait_workflow(&request(), &cancel).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, ClientError::Cancelled { .. }));
    assert_eq!(start.elapsed(), Duration::from_millis(250));
    assert_eq!(service.started.load(Ordering::SeqCst), 1);
    assert_eq!(service.finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_inflight_query() {
    let service = Arc::new(SlowService {
        delay: Duration::from_secs(30),
        started: AtomicUsize::new(0),
        finished: AtomicUsize::new(0),
    });
    let client = client(service.clone());
    let start = Instant::now();

    let err = client
        .wait_workflow_timeout(&request(), Duration::from_secs(2), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::DeadlineExceeded { timeout, .. } if timeout == Duration::from_secs(2)
    ));
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(service.finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_queries_are_sequential() {
    // Each query spans 2.5 intervals; ticks are delayed, never stacked
    let service = Arc::new(SlowService {
        delay: Duration::from_millis(250),
        started: AtomicUsize::new(0),
        finished: AtomicUsize::new(0),
    });
    let client = client(service.clone());
    let start = Instant::now();

    let wf = client
        .wait_workflow(&request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(wf.phase(), WorkflowPhase::Succeeded);
    assert_eq!(start.elapsed(), Duration::from_millis(350));
    assert_eq!(service.started.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waits_share_a_client() {
    let service = Arc::new(InMemoryWorkflowService::new());
    service.insert(Workflow::new("default", "fast").with_phase(WorkflowPhase::Running));
    service.insert(Workflow::new("default", "slow").with_phase(WorkflowPhase::Running));
    service.insert(Workflow::new("default", "stuck").with_phase(WorkflowPhase::Pending));
    service.script_phases("default", "fast", [WorkflowPhase::Succeeded]);
    service.script_phases(
        "default",
        "slow",
        [
            WorkflowPhase::Running,
            WorkflowPhase::Running,
            WorkflowPhase::Failed,
        ],
    );
    let client = client(service.clone());
    let cancel = CancellationToken::new();

    let fast_req = GetRequest::new("default", "fast");
    let slow_req = GetRequest::new("default", "slow");
    let stuck_req = GetRequest::new("default", "stuck");

    let (fast, slow, stuck) = tokio::join!(
        client.wait_workflow(&fast_req, &cancel),
        client.wait_workflow(&slow_req, &cancel),
        client.wait_workflow_timeout(&stuck_req, Duration::from_millis(550), &cancel),
    );

    assert_eq!(fast.unwrap().phase(), WorkflowPhase::Succeeded);
    assert_eq!(slow.unwrap().phase(), WorkflowPhase::Failed);
    assert!(stuck.unwrap_err().is_cancellation());
    // fast: 1, slow: 3, stuck: 5
    assert_eq!(service.get_calls(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_state_changes_between_polls_are_observed() {
    let service = seeded(WorkflowPhase::Running);
    let client = client(service.clone());

    let flipper = {
        let service = service.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(420)).await;
            service.set_phase("default", "test-workflow-00", WorkflowPhase::Succeeded);
        })
    };

    let start = Instant::now();
    let wf = client
        .wait_workflow(&request(), &CancellationToken::new())
        .await
        .unwrap();
    flipper.await.unwrap();

    assert_eq!(wf.phase(), WorkflowPhase::Succeeded);
    assert_eq!(start.elapsed(), Duration::from_millis(500));
    assert_eq!(service.get_calls(), 5);
}

#[tokio::test]
async fn test_create_and_get_are_passthroughs() {
    let service = Arc::new(InMemoryWorkflowService::new());
    let client = client(service.clone());

    let mut manifest = Workflow::new("", "test-workflow-00");
    manifest.spec = serde_json::json!({"entrypoint": "whalesay"});

    let created = client
        .create_workflow(&CreateRequest::new("default", manifest))
        .await
        .unwrap();
    assert_eq!(created.name(), "test-workflow-00");
    assert_eq!(created.namespace(), "default");
    assert_eq!(created.phase(), WorkflowPhase::Pending);

    let fetched = client.get_workflow(&request()).await.unwrap();
    assert_eq!(fetched, created);

    let missing = client
        .get_workflow(&GetRequest::new("default", "test-job-00"))
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
    assert_eq!(missing.operation(), Some(Operation::GetWorkflow));

    let duplicate = client
        .create_workflow(&CreateRequest::new("default", Workflow::new("", "test-workflow-00")))
        .await
        .unwrap_err();
    assert_eq!(duplicate.operation(), Some(Operation::CreateWorkflow));
    assert!(matches!(
        duplicate.service_error(),
        Some(ServiceError::Api { status: 409, .. })
    ));
}
