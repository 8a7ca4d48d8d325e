//! Recognition events and results
//!
//! Sessions publish these on the coordinator's broadcast channel; external
//! subscribers receive them via [`crate::Recognizer::subscribe`]. Events for
//! a single session arrive in causal order: `SessionStarted`, then any
//! speech/result events, then `SessionStopped`.

use serde::{Deserialize, Serialize};

/// One recognition hypothesis from the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Unique id for this result
    pub result_id: String,

    /// Recognized text
    pub text: String,

    /// Confidence score (0.0 to 1.0), if the engine provides one
    pub confidence: Option<f32>,

    /// Whether this is a partial (interim) hypothesis
    pub partial: bool,
}

impl RecognitionResult {
    /// Build a final result with a fresh id
    pub fn final_text(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            result_id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            confidence,
            partial: false,
        }
    }

    /// Build a partial (interim) result with a fresh id
    pub fn partial_text(text: impl Into<String>) -> Self {
        Self {
            result_id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            confidence: None,
            partial: true,
        }
    }
}

/// Notification fanned out to recognizer subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecognizerEvent {
    /// A session began executing a recognition mode
    SessionStarted { session_id: String },

    /// The session returned to idle (completion, stop, or error)
    SessionStopped { session_id: String },

    /// The engine detected the start of speech
    SpeechStartDetected { session_id: String },

    /// The engine detected the end of speech
    SpeechEndDetected { session_id: String },

    /// The engine produced a partial or final result
    Result {
        session_id: String,
        result: RecognitionResult,
    },
}

impl RecognizerEvent {
    /// The session this event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            RecognizerEvent::SessionStarted { session_id }
            | RecognizerEvent::SessionStopped { session_id }
            | RecognizerEvent::SpeechStartDetected { session_id }
            | RecognizerEvent::SpeechEndDetected { session_id }
            | RecognizerEvent::Result { session_id, .. } => session_id,
        }
    }
}
