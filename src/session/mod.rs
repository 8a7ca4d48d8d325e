//! Recognition session management
//!
//! This module provides the `Session` abstraction that manages:
//! - Binding to a recognition engine
//! - Mutually-exclusive recognition modes (single-shot, continuous, keyword)
//! - Supervision of the engine's event stream on a background task
//! - Ordered lifecycle/result event emission
//! - Forced teardown for disable/term

mod session;

pub use session::{ActiveMode, Session};
