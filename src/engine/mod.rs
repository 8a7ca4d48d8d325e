//! Recognition engine abstraction
//!
//! The coordinator treats recognition execution as an opaque asynchronous
//! unit of work: given a mode and optional keyword, an engine produces
//! zero-or-more partial/final results on a channel and eventually signals
//! completion or failure. Implementations:
//! - Mock: scripted engine for tests and the demo binary
//! - Real engines (acoustic/language model bindings) live outside this crate

use anyhow::Result;
use tokio::sync::mpsc;

use crate::events::RecognitionResult;

mod mock;

pub use mock::MockEngine;

/// Recognition mode requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognitionMode {
    /// Recognize a single utterance, then complete
    SingleShot,
    /// Recognize until explicitly stopped
    Continuous,
    /// Listen for a trigger keyword until explicitly stopped
    KeywordSpotting,
}

/// Parameters for one engine run
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Session the run belongs to (for engine-side logging/correlation)
    pub session_id: String,
    /// Requested recognition mode
    pub mode: RecognitionMode,
    /// Trigger keyword; set only for keyword spotting
    pub keyword: Option<String>,
}

/// Event emitted by an engine during a run.
///
/// A run ends with exactly one of `Completed` or `Failed` (or by the engine
/// closing the channel, treated as `Completed`).
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Speech onset detected in the audio stream
    SpeechStart,
    /// Speech offset detected
    SpeechEnd,
    /// A partial or final recognition hypothesis
    Result(RecognitionResult),
    /// The run finished normally
    Completed,
    /// The run aborted with an engine-side error
    Failed(String),
}

/// Recognition engine trait
///
/// One engine instance runs at most one request at a time; the session
/// guarantees that by claiming a mode before calling `start`.
#[async_trait::async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Begin a recognition run
    ///
    /// Returns a channel receiver delivering the run's events
    async fn start(&mut self, request: EngineRequest) -> Result<mpsc::Receiver<EngineEvent>>;

    /// Ask the current run to wind down; it must still emit a terminal event
    async fn stop(&mut self) -> Result<()>;

    /// Whether a run is currently active
    fn is_running(&self) -> bool;

    /// Engine name for logging
    fn name(&self) -> &str;
}
