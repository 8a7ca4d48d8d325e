//! Cancellable, awaitable operation handles
//!
//! Every recognition call returns an [`AsyncOperation`] immediately; the
//! work itself runs on a session task that resolves the operation through a
//! paired [`OperationHandle`]. Built on a `tokio::sync::watch` channel so
//! any number of observers can await the same handle and all see the same
//! terminal outcome, without polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::RecognizerError;

/// Observable state of an in-flight operation.
///
/// Exactly one of the terminal states (`Completed`, `Failed`, `Cancelled`)
/// is reachable; once set it never changes.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
    /// Created but not yet claimed by a worker
    Pending,
    /// Claimed; engine work is in flight
    Running,
    /// Finished successfully with a value
    Completed(T),
    /// Finished with an error
    Failed(RecognizerError),
    /// Aborted before or during execution
    Cancelled,
}

impl<T> OperationState<T> {
    /// Whether this state is terminal (immutable from here on)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Completed(_) | OperationState::Failed(_) | OperationState::Cancelled
        )
    }

    /// Whether the operation has been claimed and is still in flight
    pub fn is_running(&self) -> bool {
        matches!(self, OperationState::Running)
    }
}

struct Shared<T> {
    state: watch::Sender<OperationState<T>>,
    /// Advisory mid-flight cancellation flag, checked by the worker
    cancel_requested: AtomicBool,
}

impl<T: Clone> Shared<T> {
    /// Apply `next` only if the current state is not yet terminal
    fn transition(&self, next: OperationState<T>) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

/// Caller-facing handle: awaitable, cancellable, cheaply cloneable
pub struct AsyncOperation<T: Clone> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> Clone for AsyncOperation<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> AsyncOperation<T> {
    /// Create an unclaimed operation and the completer its worker will use
    pub fn pending() -> (OperationHandle<T>, AsyncOperation<T>) {
        let (tx, _rx) = watch::channel(OperationState::Pending);
        let shared = Arc::new(Shared {
            state: tx,
            cancel_requested: AtomicBool::new(false),
        });
        (
            OperationHandle {
                shared: Arc::clone(&shared),
            },
            AsyncOperation { shared },
        )
    }

    /// An operation that is already successfully finished
    pub fn completed(value: T) -> Self {
        let (handle, op) = Self::pending();
        handle.complete(value);
        op
    }

    /// An operation that failed before any work started
    pub fn failed(error: RecognizerError) -> Self {
        let (handle, op) = Self::pending();
        handle.fail(error);
        op
    }

    /// Snapshot of the current state
    pub fn state(&self) -> OperationState<T> {
        self.shared.state.borrow().clone()
    }

    /// Request cancellation.
    ///
    /// If the worker has not claimed the operation yet, it transitions
    /// straight to `Cancelled`. Once running, this is advisory: the worker
    /// decides when it can honor it, but must still reach a terminal state.
    pub fn cancel(&self) {
        self.shared.cancel_requested.store(true, Ordering::SeqCst);
        self.shared.state.send_if_modified(|state| {
            if matches!(state, OperationState::Pending) {
                *state = OperationState::Cancelled;
                true
            } else {
                false
            }
        });
    }

    /// Suspend until the operation reaches a terminal state.
    ///
    /// Every waiter observes the same outcome; waiting again after
    /// completion returns immediately.
    pub async fn wait(&self) -> Result<T, RecognizerError> {
        let mut rx = self.shared.state.subscribe();
        let state = rx
            .wait_for(|state| state.is_terminal())
            .await
            .map(|state| state.clone())
            .map_err(|_| RecognizerError::Cancelled)?;

        match state {
            OperationState::Completed(value) => Ok(value),
            OperationState::Failed(error) => Err(error),
            OperationState::Cancelled => Err(RecognizerError::Cancelled),
            OperationState::Pending | OperationState::Running => unreachable!(),
        }
    }
}

/// Worker-facing completer for an [`AsyncOperation`]
pub struct OperationHandle<T: Clone> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> Clone for OperationHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> OperationHandle<T> {
    /// Claim the operation for execution.
    ///
    /// Returns false if it was cancelled (or otherwise finished) before the
    /// worker got to it; in that case no work should start.
    pub fn try_run(&self) -> bool {
        let mut claimed = false;
        self.shared.state.send_if_modified(|state| {
            if !matches!(state, OperationState::Pending) {
                return false;
            }
            if self.shared.cancel_requested.load(Ordering::SeqCst) {
                *state = OperationState::Cancelled;
            } else {
                *state = OperationState::Running;
                claimed = true;
            }
            true
        });
        claimed
    }

    /// Whether a caller has asked for cancellation
    pub fn cancel_requested(&self) -> bool {
        self.shared.cancel_requested.load(Ordering::SeqCst)
    }

    /// Mark cancellation requested and cancel immediately if still pending
    pub fn request_cancel(&self) {
        self.shared.cancel_requested.store(true, Ordering::SeqCst);
        self.shared.state.send_if_modified(|state| {
            if matches!(state, OperationState::Pending) {
                *state = OperationState::Cancelled;
                true
            } else {
                false
            }
        });
    }

    /// Resolve successfully; no-op if already terminal
    pub fn complete(&self, value: T) -> bool {
        self.shared.transition(OperationState::Completed(value))
    }

    /// Resolve with an error; no-op if already terminal
    pub fn fail(&self, error: RecognizerError) -> bool {
        self.shared.transition(OperationState::Failed(error))
    }

    /// Force the cancelled terminal state; no-op if already terminal
    pub fn cancel(&self) -> bool {
        self.shared.cancel_requested.store(true, Ordering::SeqCst);
        self.shared.transition(OperationState::Cancelled)
    }
}
