pub mod asyncop;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod properties;
pub mod recognizer;
pub mod session;

pub use asyncop::{AsyncOperation, OperationHandle, OperationState};
pub use config::Config;
pub use engine::{EngineEvent, EngineRequest, MockEngine, RecognitionEngine, RecognitionMode};
pub use error::RecognizerError;
pub use events::{RecognitionResult, RecognizerEvent};
pub use properties::PropertyStore;
pub use recognizer::{Recognizer, RecognizerSite};
pub use session::{ActiveMode, Session};
