use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{
    FailingService, PanickingService, StubbornService, TickingService, wait_for_count, wait_for_state,
};
use crate::service::{ServiceError, ServiceState, SupervisedService};

#[test]
fn test_new_service_is_stopped_without_error() {
    let service = SupervisedService::new("idle", Arc::new(TickingService::new(Arc::new(AtomicUsize::new(0)))));
    assert_eq!(service.title(), "idle");
    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(service.last_error().is_none());
}

#[test]
fn test_run_without_runtime_fails_the_service() {
    let service = Arc::new(SupervisedService::new(
        "orphan",
        Arc::new(TickingService::new(Arc::new(AtomicUsize::new(0)))),
    ));

    service.run(&CancellationToken::new());

    assert_eq!(service.state(), ServiceState::Failed);
    assert!(matches!(service.last_error().as_deref(), Some(ServiceError::NoRuntime)));
}

#[tokio::test]
async fn test_ticking_service_runs_until_scope_cancelled() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(SupervisedService::new("ticker", Arc::new(TickingService::new(ticks.clone()))));
    let scope = CancellationToken::new();

    service.run(&scope);
    assert_eq!(service.state(), ServiceState::Running);
    assert!(wait_for_count(&ticks, 3).await, "Service should make progress");

    scope.cancel();
    assert!(wait_for_state(&service, ServiceState::Stopped).await);
    assert!(service.last_error().is_none(), "Cancellation is not an error");
}

#[tokio::test]
async fn test_second_run_while_running_is_a_no_op() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(SupervisedService::new("ticker", Arc::new(TickingService::new(ticks.clone()))));
    let first_scope = CancellationToken::new();

    service.run(&first_scope);
    service.run(&CancellationToken::new());
    assert!(service.is_running());

    // The running task still belongs to the first scope
    first_scope.cancel();
    assert!(wait_for_state(&service, ServiceState::Stopped).await);
}

#[tokio::test]
async fn test_returned_error_marks_service_failed() {
    let service = Arc::new(SupervisedService::new(
        "broken",
        Arc::new(FailingService { message: "socket closed" }),
    ));

    service.run(&CancellationToken::new());

    assert!(wait_for_state(&service, ServiceState::Failed).await);
    let err = service.last_error().expect("Failure should be recorded");
    assert_eq!(err.to_string(), "Service failed: socket closed");
}

#[tokio::test]
async fn test_panic_is_contained_and_service_can_restart() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let service = Arc::new(SupervisedService::new(
        "fragile",
        Arc::new(PanickingService {
            ticks: ticks.clone(),
            panic_at: 3,
            armed: Arc::new(AtomicBool::new(true)),
        }),
    ));
    let scope = CancellationToken::new();

    service.run(&scope);
    assert!(wait_for_state(&service, ServiceState::Failed).await);
    match service.last_error().as_deref() {
        Some(ServiceError::Panicked { message }) => assert_eq!(message, "tick 3 exploded"),
        other => panic!("Expected a panic error, got {:?}", other),
    }
    let ticks_at_failure = ticks.load(Ordering::SeqCst);

    service.run(&scope);
    assert_eq!(service.state(), ServiceState::Running);
    assert!(wait_for_count(&ticks, ticks_at_failure + 5).await, "Iterations proceed after restart");
    assert!(service.is_running());
    assert!(service.last_error().is_some(), "The last error is sticky");

    scope.cancel();
    assert!(wait_for_state(&service, ServiceState::Stopped).await);
}

#[tokio::test]
async fn test_stop_reports_stopped_immediately() {
    let service = Arc::new(SupervisedService::new(
        "stubborn",
        Arc::new(StubbornService { delay: Duration::from_millis(50) }),
    ));

    service.run(&CancellationToken::new());
    service.stop();
    assert_eq!(service.state(), ServiceState::Stopped);

    // The task keeps running until it exits on its own; its late failure is
    // recorded but does not override the explicit stop.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(service.last_error().is_some());
}

#[tokio::test]
async fn test_stop_cancels_only_this_service() {
    let scope = CancellationToken::new();
    let a_ticks = Arc::new(AtomicUsize::new(0));
    let b_ticks = Arc::new(AtomicUsize::new(0));
    let a = Arc::new(SupervisedService::new("a", Arc::new(TickingService::new(a_ticks.clone()))));
    let b = Arc::new(SupervisedService::new("b", Arc::new(TickingService::new(b_ticks.clone()))));

    a.run(&scope);
    b.run(&scope);
    a.stop();

    assert_eq!(a.state(), ServiceState::Stopped);
    let b_before = b_ticks.load(Ordering::SeqCst);
    assert!(wait_for_count(&b_ticks, b_before + 3).await);
    assert!(b.is_running());
    assert!(!scope.is_cancelled());

    scope.cancel();
    assert!(wait_for_state(&b, ServiceState::Stopped).await);
}

#[tokio::test]
async fn test_restart_after_stop_ignores_old_run() {
    let service = Arc::new(SupervisedService::new(
        "stubborn",
        Arc::new(StubbornService { delay: Duration::from_millis(30) }),
    ));
    let scope = CancellationToken::new();

    service.run(&scope);
    service.stop();
    service.run(&scope);
    assert_eq!(service.state(), ServiceState::Running);

    // Both runs fail after 30ms; only the second one may change the state.
    assert!(wait_for_state(&service, ServiceState::Failed).await);
}
