use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::asyncop::{AsyncOperation, OperationHandle};
use crate::engine::{EngineEvent, EngineRequest, RecognitionEngine, RecognitionMode};
use crate::error::RecognizerError;
use crate::events::{RecognitionResult, RecognizerEvent};

/// The recognition mode a session is currently executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveMode {
    /// No recognition in flight
    Idle,
    /// One utterance, then back to idle
    SingleShot,
    /// Recognizing until stopped
    Continuous,
    /// Spotting a trigger keyword until stopped
    KeywordSpotting,
}

impl ActiveMode {
    fn engine_mode(self) -> RecognitionMode {
        match self {
            ActiveMode::SingleShot => RecognitionMode::SingleShot,
            ActiveMode::Continuous => RecognitionMode::Continuous,
            ActiveMode::KeywordSpotting => RecognitionMode::KeywordSpotting,
            ActiveMode::Idle => unreachable!("idle is never dispatched to the engine"),
        }
    }
}

/// The operation handle for the run currently claiming the session.
///
/// Kept in session state so disable/term can request cancellation; the
/// supervision task holds its own clone and performs the resolution.
#[derive(Clone)]
enum CurrentOp {
    SingleShot(OperationHandle<RecognitionResult>),
    Mode(OperationHandle<()>),
}

impl CurrentOp {
    fn try_run(&self) -> bool {
        match self {
            CurrentOp::SingleShot(handle) => handle.try_run(),
            CurrentOp::Mode(handle) => handle.try_run(),
        }
    }

    fn cancel_requested(&self) -> bool {
        match self {
            CurrentOp::SingleShot(handle) => handle.cancel_requested(),
            CurrentOp::Mode(handle) => handle.cancel_requested(),
        }
    }

    fn request_cancel(&self) {
        match self {
            CurrentOp::SingleShot(handle) => handle.request_cancel(),
            CurrentOp::Mode(handle) => handle.request_cancel(),
        }
    }

    fn fail(&self, error: RecognizerError) {
        match self {
            CurrentOp::SingleShot(handle) => {
                handle.fail(error);
            }
            CurrentOp::Mode(handle) => {
                handle.fail(error);
            }
        }
    }
}

/// Mode/keyword/operation state, guarded by one sync lock.
///
/// Transitions are fast and never await while holding the lock.
struct SessionState {
    mode: ActiveMode,
    /// Set only while keyword spotting is active
    keyword: Option<String>,
    current: Option<CurrentOp>,
}

/// The live binding between the coordinator and a recognition engine for
/// one recognition lifecycle. Runs exactly one mode at a time and emits
/// ordered events: Started, zero-or-more SpeechStart/SpeechEnd/Result,
/// then Stopped.
pub struct Session {
    /// Unique session identifier, generated at creation
    id: String,

    /// The engine this session drives
    engine: Mutex<Box<dyn RecognitionEngine>>,

    /// Mode transition guard
    state: StdMutex<SessionState>,

    /// Event hub; a clone of the coordinator's broadcast sender, so the
    /// session never owns (or blocks on) its subscribers
    events: broadcast::Sender<RecognizerEvent>,

    /// Handle for the engine supervision task
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session around an engine, emitting events on `events`
    pub fn new(
        engine: Box<dyn RecognitionEngine>,
        events: broadcast::Sender<RecognizerEvent>,
    ) -> Arc<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        info!("Creating recognition session {} (engine: {})", id, engine.name());

        Arc::new(Self {
            id,
            engine: Mutex::new(engine),
            state: StdMutex::new(SessionState {
                mode: ActiveMode::Idle,
                keyword: None,
                current: None,
            }),
            events,
            worker: Mutex::new(None),
        })
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Currently executing mode
    pub fn active_mode(&self) -> ActiveMode {
        self.state.lock().unwrap().mode
    }

    /// The active trigger keyword, if keyword spotting is running
    pub fn keyword(&self) -> Option<String> {
        self.state.lock().unwrap().keyword.clone()
    }

    /// Recognize a single utterance.
    ///
    /// The operation resolves with the final result once the engine run
    /// completes; partial results are only visible as events.
    pub async fn recognize_once(self: &Arc<Self>) -> AsyncOperation<RecognitionResult> {
        let (handle, op) = AsyncOperation::pending();
        self.start_mode(ActiveMode::SingleShot, None, CurrentOp::SingleShot(handle))
            .await;
        op
    }

    /// Start continuous recognition.
    ///
    /// The operation stays Running for the whole mode run: Completed on a
    /// clean stop, Failed on engine error, Cancelled on forced teardown.
    pub async fn start_continuous(self: &Arc<Self>) -> AsyncOperation<()> {
        let (handle, op) = AsyncOperation::pending();
        self.start_mode(ActiveMode::Continuous, None, CurrentOp::Mode(handle))
            .await;
        op
    }

    /// Stop continuous recognition; trivially successful if not running
    pub async fn stop_continuous(&self) -> AsyncOperation<()> {
        self.stop_mode(ActiveMode::Continuous).await
    }

    /// Start keyword spotting for a non-empty keyword
    pub async fn start_keyword(self: &Arc<Self>, keyword: &str) -> AsyncOperation<()> {
        if keyword.trim().is_empty() {
            return AsyncOperation::failed(RecognizerError::InvalidArgument(
                "keyword must be non-empty".to_string(),
            ));
        }
        let (handle, op) = AsyncOperation::pending();
        self.start_mode(
            ActiveMode::KeywordSpotting,
            Some(keyword.to_string()),
            CurrentOp::Mode(handle),
        )
        .await;
        op
    }

    /// Stop keyword spotting; trivially successful if not running
    pub async fn stop_keyword(&self) -> AsyncOperation<()> {
        self.stop_mode(ActiveMode::KeywordSpotting).await
    }

    /// React to the coordinator's enabled flag changing.
    ///
    /// Disabling stops any active mode and cancels its operation; enabling
    /// does not resume previously stopped work.
    pub async fn on_enabled_changed(&self, enabled: bool) {
        if enabled {
            return;
        }

        let current = self.state.lock().unwrap().current.clone();
        let Some(current) = current else {
            return;
        };

        info!("Session {} disabled while active; stopping", self.id);
        current.request_cancel();

        let mut engine = self.engine.lock().await;
        if let Err(e) = engine.stop().await {
            warn!("Engine stop during disable failed: {}", e);
        }
    }

    /// Force-cancel any outstanding operation and wait for the supervision
    /// task to finish. No events fire for this session after this returns.
    pub async fn shutdown(&self) {
        info!("Shutting down session {}", self.id);

        let current = self.state.lock().unwrap().current.clone();
        if let Some(current) = current {
            current.request_cancel();
        }

        {
            let mut engine = self.engine.lock().await;
            if engine.is_running() {
                if let Err(e) = engine.stop().await {
                    warn!("Engine stop during shutdown failed: {}", e);
                }
            }
        }

        let worker = self.worker.lock().await.take();
        if let Some(task) = worker {
            if let Err(e) = task.await {
                error!("Session worker panicked: {}", e);
            }
        }
    }

    /// Claim `mode` and launch the engine run that backs it
    async fn start_mode(self: &Arc<Self>, mode: ActiveMode, keyword: Option<String>, op: CurrentOp) {
        // Hold the worker slot for the whole launch: a stop racing this
        // start must wait and observe the new run's handle, never a stale
        // one left over from a finished run
        let mut worker = self.worker.lock().await;

        // Fast, sync-only critical section for the transition itself
        {
            let mut state = self.state.lock().unwrap();
            if state.mode != ActiveMode::Idle {
                warn!(
                    "Session {}: rejected {:?} start while {:?} active",
                    self.id, mode, state.mode
                );
                op.fail(RecognizerError::OperationInProgress);
                return;
            }
            state.mode = mode;
            state.keyword = keyword.clone();
            state.current = Some(op.clone());
        }

        let request = EngineRequest {
            session_id: self.id.clone(),
            mode: mode.engine_mode(),
            keyword,
        };

        let rx = {
            let mut engine = self.engine.lock().await;
            engine.start(request).await
        };

        let rx = match rx {
            Ok(rx) => rx,
            Err(e) => {
                error!("Engine start failed for session {}: {}", self.id, e);
                self.release();
                op.fail(RecognizerError::EngineFailure(e.to_string()));
                return;
            }
        };

        let session = Arc::clone(self);
        *worker = Some(tokio::spawn(async move {
            session.supervise(rx, op).await;
        }));
    }

    /// Drive one engine run to completion and resolve its operation
    async fn supervise(self: Arc<Self>, mut rx: mpsc::Receiver<EngineEvent>, op: CurrentOp) {
        if !op.try_run() {
            // Cancelled between dispatch and execution; unwind quietly
            debug!("Session {}: run cancelled before it started", self.id);
            let mut engine = self.engine.lock().await;
            let _ = engine.stop().await;
            drop(engine);
            self.release();
            return;
        }

        self.fire(RecognizerEvent::SessionStarted {
            session_id: self.id.clone(),
        });

        let mut final_result: Option<RecognitionResult> = None;
        let mut engine_error: Option<String> = None;

        while let Some(event) = rx.recv().await {
            match event {
                EngineEvent::SpeechStart => {
                    self.fire(RecognizerEvent::SpeechStartDetected {
                        session_id: self.id.clone(),
                    });
                }
                EngineEvent::SpeechEnd => {
                    self.fire(RecognizerEvent::SpeechEndDetected {
                        session_id: self.id.clone(),
                    });
                }
                EngineEvent::Result(result) => {
                    if !result.partial {
                        final_result = Some(result.clone());
                    }
                    self.fire(RecognizerEvent::Result {
                        session_id: self.id.clone(),
                        result,
                    });
                }
                EngineEvent::Completed => break,
                EngineEvent::Failed(message) => {
                    error!("Engine failure in session {}: {}", self.id, message);
                    engine_error = Some(message);
                    break;
                }
            }
        }

        let cancelled = op.cancel_requested();
        match op {
            CurrentOp::SingleShot(handle) => {
                if let Some(message) = engine_error {
                    handle.fail(RecognizerError::EngineFailure(message));
                } else if cancelled {
                    handle.cancel();
                } else if let Some(result) = final_result {
                    handle.complete(result);
                } else {
                    handle.fail(RecognizerError::EngineFailure(
                        "engine completed without a final result".to_string(),
                    ));
                }
            }
            CurrentOp::Mode(handle) => {
                if let Some(message) = engine_error {
                    handle.fail(RecognizerError::EngineFailure(message));
                } else if cancelled {
                    handle.cancel();
                } else {
                    handle.complete(());
                }
            }
        }

        self.release();
        self.fire(RecognizerEvent::SessionStopped {
            session_id: self.id.clone(),
        });
    }

    /// Stop the given mode if it is the one running; no-op success otherwise.
    ///
    /// Returns without blocking; the operation completes once the
    /// supervision task has wound down.
    async fn stop_mode(&self, expected: ActiveMode) -> AsyncOperation<()> {
        {
            let state = self.state.lock().unwrap();
            if state.mode != expected {
                debug!(
                    "Session {}: stop {:?} while {:?}; nothing to do",
                    self.id, expected, state.mode
                );
                return AsyncOperation::completed(());
            }
        }

        let (handle, op) = AsyncOperation::pending();
        handle.try_run();

        {
            let mut engine = self.engine.lock().await;
            if let Err(e) = engine.stop().await {
                handle.fail(RecognizerError::EngineFailure(e.to_string()));
                return op;
            }
        }

        let worker = self.worker.lock().await.take();
        match worker {
            Some(task) => {
                tokio::spawn(async move {
                    if let Err(e) = task.await {
                        error!("Session worker panicked: {}", e);
                    }
                    handle.complete(());
                });
            }
            None => {
                handle.complete(());
            }
        }

        op
    }

    /// Return to idle and drop the current operation reference
    fn release(&self) {
        let mut state = self.state.lock().unwrap();
        state.mode = ActiveMode::Idle;
        state.keyword = None;
        state.current = None;
    }

    /// Fan an event out to subscribers without blocking session progress
    fn fire(&self, event: RecognizerEvent) {
        debug!("Session event: {:?}", event);
        // A send error just means nobody is subscribed right now
        let _ = self.events.send(event);
    }
}
