// Unit tests for the AsyncOperation primitive
//
// These verify the state machine (terminal states set exactly once),
// multi-observer waiting, and the two cancellation windows.

use std::time::Duration;

use speech_coordinator::{AsyncOperation, OperationState, RecognizerError};
use tokio::time::timeout;

#[tokio::test]
async fn test_completed_constructor_resolves_immediately() {
    let op = AsyncOperation::completed(42u32);

    assert_eq!(op.state(), OperationState::Completed(42));
    assert_eq!(op.wait().await.unwrap(), 42);
}

#[tokio::test]
async fn test_failed_constructor_resolves_immediately() {
    let op: AsyncOperation<()> = AsyncOperation::failed(RecognizerError::NotEnabled);

    assert_eq!(op.wait().await.unwrap_err(), RecognizerError::NotEnabled);
}

#[tokio::test]
async fn test_wait_suspends_until_worker_completes() {
    let (handle, op) = AsyncOperation::pending();

    tokio::spawn(async move {
        assert!(handle.try_run());
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.complete("done".to_string());
    });

    let value = timeout(Duration::from_secs(1), op.wait())
        .await
        .expect("wait timed out")
        .unwrap();
    assert_eq!(value, "done");
}

#[tokio::test]
async fn test_all_observers_see_the_same_outcome() {
    let (handle, op) = AsyncOperation::pending();
    let observer_a = op.clone();
    let observer_b = op.clone();

    let a = tokio::spawn(async move { observer_a.wait().await });
    let b = tokio::spawn(async move { observer_b.wait().await });

    handle.try_run();
    handle.complete(7u64);

    assert_eq!(a.await.unwrap().unwrap(), 7);
    assert_eq!(b.await.unwrap().unwrap(), 7);
    // Waiting again after completion returns immediately
    assert_eq!(op.wait().await.unwrap(), 7);
}

#[tokio::test]
async fn test_terminal_state_is_set_exactly_once() {
    let (handle, op) = AsyncOperation::pending();

    handle.try_run();
    assert!(handle.complete(1u32));
    assert!(!handle.fail(RecognizerError::Cancelled));
    assert!(!handle.cancel());
    assert!(!handle.complete(2));

    assert_eq!(op.state(), OperationState::Completed(1));
}

#[tokio::test]
async fn test_cancel_before_claim_goes_straight_to_cancelled() {
    let (handle, op): (_, AsyncOperation<()>) = AsyncOperation::pending();

    op.cancel();

    assert_eq!(op.state(), OperationState::Cancelled);
    // The worker must not start: the claim is refused
    assert!(!handle.try_run());
    assert_eq!(op.wait().await.unwrap_err(), RecognizerError::Cancelled);
}

#[tokio::test]
async fn test_cancel_mid_flight_is_advisory() {
    let (handle, op): (_, AsyncOperation<u32>) = AsyncOperation::pending();
    assert!(handle.try_run());

    op.cancel();

    // Still running; the worker decides when to honor the request
    assert_eq!(op.state(), OperationState::Running);
    assert!(handle.cancel_requested());

    handle.cancel();
    assert_eq!(op.wait().await.unwrap_err(), RecognizerError::Cancelled);
}

#[tokio::test]
async fn test_failed_operation_reports_error_to_all_waiters() {
    let (handle, op): (_, AsyncOperation<u32>) = AsyncOperation::pending();
    let observer = op.clone();

    handle.try_run();
    handle.fail(RecognizerError::EngineFailure("model crashed".to_string()));

    let expected = RecognizerError::EngineFailure("model crashed".to_string());
    assert_eq!(op.wait().await.unwrap_err(), expected);
    assert_eq!(observer.wait().await.unwrap_err(), expected);
    assert_eq!(
        op.state(),
        OperationState::Failed(RecognizerError::EngineFailure("model crashed".to_string()))
    );
}
