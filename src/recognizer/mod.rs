//! Recognizer coordinator
//!
//! The top-level object callers interact with. It owns the enabled flag,
//! lazily creates (and exclusively owns) the default session, dispatches
//! recognition requests as async operations, and re-broadcasts session
//! events to any number of external subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::asyncop::AsyncOperation;
use crate::engine::RecognitionEngine;
use crate::error::RecognizerError;
use crate::events::{RecognitionResult, RecognizerEvent};
use crate::properties::PropertyStore;
use crate::session::Session;

/// Subscribers slower than this many buffered events start lagging
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The external environment a recognizer is wired into.
///
/// Supplies the parent property store (configuration the recognizer
/// inherits) and the factory producing engines bound to the real
/// recognition stack.
#[async_trait::async_trait]
pub trait RecognizerSite: Send + Sync {
    /// The enclosing property store this recognizer's store falls back to
    fn parent_properties(&self) -> Arc<PropertyStore>;

    /// Produce an engine for a new session
    async fn create_engine(&self) -> anyhow::Result<Box<dyn RecognitionEngine>>;
}

/// Coordinates the lifecycle of recognition sessions.
///
/// Constructed enabled and without a session; `init` wires the site,
/// recognition calls create the default session on first use, and `term`
/// tears everything down again. All methods may be called from any number
/// of tasks concurrently.
pub struct Recognizer {
    /// Gates whether recognition work may proceed
    enabled: AtomicBool,

    /// Set by init(), cleared by term()
    site: StdMutex<Option<Arc<dyn RecognizerSite>>>,

    /// Lazily-created; the recognizer is the sole owner of its lifetime
    default_session: Mutex<Option<Arc<Session>>>,

    /// This recognizer's property layer; child of the site's store
    properties: Arc<PropertyStore>,

    /// Event hub shared with the session and handed to subscribers
    events: broadcast::Sender<RecognizerEvent>,
}

impl Recognizer {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            enabled: AtomicBool::new(true),
            site: StdMutex::new(None),
            default_session: Mutex::new(None),
            properties: PropertyStore::new(),
            events,
        }
    }

    /// Wire the recognizer to its site: stores the link and chains this
    /// recognizer's properties under the site's store
    pub fn init(&self, site: Arc<dyn RecognizerSite>) {
        info!("Initializing recognizer");
        self.properties.link_parent(&site.parent_properties());
        *self.site.lock().unwrap() = Some(site);
    }

    /// Tear down: force-cancel outstanding work, release the default
    /// session and the site link. Idempotent; never fails.
    pub async fn term(&self) {
        info!("Terminating recognizer");

        let session = self.default_session.lock().await.take();
        if let Some(session) = session {
            session.shutdown().await;
        }

        self.properties.unlink_parent();
        *self.site.lock().unwrap() = None;
    }

    /// Whether recognition calls are currently allowed
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Allow recognition calls; no-op if already enabled
    pub async fn enable(&self) {
        self.set_enabled(true).await;
    }

    /// Block recognition calls and stop any active mode; no-op if already
    /// disabled. Never fails: outstanding operations are forced terminal.
    pub async fn disable(&self) {
        self.set_enabled(false).await;
    }

    async fn set_enabled(&self, enabled: bool) {
        if self.enabled.swap(enabled, Ordering::SeqCst) == enabled {
            return;
        }

        info!("Recognizer {}", if enabled { "enabled" } else { "disabled" });

        let session = self.default_session.lock().await.clone();
        if let Some(session) = session {
            session.on_enabled_changed(enabled).await;
        }
    }

    /// This recognizer's property store (local overrides over the site's)
    pub fn properties(&self) -> &Arc<PropertyStore> {
        &self.properties
    }

    /// Look up a property, falling back to the site's store
    pub fn get_string_value(&self, name: &str) -> Option<String> {
        self.properties.get_string_value(name)
    }

    /// Set a property in this recognizer's local layer
    pub fn set_string_value(&self, name: &str, value: &str) {
        self.properties.set_string_value(name, value);
    }

    /// Register for session/result events
    pub fn subscribe(&self) -> broadcast::Receiver<RecognizerEvent> {
        self.events.subscribe()
    }

    /// The default session, created on first use.
    ///
    /// Shared ownership: callers (and in-flight operations) may hold the
    /// returned handle, but the recognizer alone decides when it dies.
    pub async fn default_session(&self) -> Result<Arc<Session>, RecognizerError> {
        let mut slot = self.default_session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        let site = self
            .site
            .lock()
            .unwrap()
            .clone()
            .ok_or(RecognizerError::NotInitialized)?;

        let engine = site
            .create_engine()
            .await
            .map_err(|e| RecognizerError::EngineFailure(e.to_string()))?;

        let session = Session::new(engine, self.events.clone());
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Whether the default session currently exists
    pub async fn has_default_session(&self) -> bool {
        self.default_session.lock().await.is_some()
    }

    /// Recognize one utterance on the default session.
    ///
    /// Fails immediately (without engine work) when disabled, or when
    /// another mode is already active.
    pub async fn recognize_async(&self) -> AsyncOperation<RecognitionResult> {
        if !self.is_enabled() {
            return AsyncOperation::failed(RecognizerError::NotEnabled);
        }
        match self.default_session().await {
            Ok(session) => session.recognize_once().await,
            Err(error) => AsyncOperation::failed(error),
        }
    }

    /// Start continuous recognition on the default session
    pub async fn start_continuous_recognition(&self) -> AsyncOperation<()> {
        if !self.is_enabled() {
            return AsyncOperation::failed(RecognizerError::NotEnabled);
        }
        match self.default_session().await {
            Ok(session) => session.start_continuous().await,
            Err(error) => AsyncOperation::failed(error),
        }
    }

    /// Stop continuous recognition; trivially successful if not running
    pub async fn stop_continuous_recognition(&self) -> AsyncOperation<()> {
        let session = self.default_session.lock().await.clone();
        match session {
            Some(session) => session.stop_continuous().await,
            None => AsyncOperation::completed(()),
        }
    }

    /// Start keyword spotting for `keyword` on the default session.
    ///
    /// An empty keyword fails before the session is even created, so a bad
    /// call has no observable side effect.
    pub async fn start_keyword_recognition(&self, keyword: &str) -> AsyncOperation<()> {
        if !self.is_enabled() {
            return AsyncOperation::failed(RecognizerError::NotEnabled);
        }
        if keyword.trim().is_empty() {
            return AsyncOperation::failed(RecognizerError::InvalidArgument(
                "keyword must be non-empty".to_string(),
            ));
        }
        match self.default_session().await {
            Ok(session) => session.start_keyword(keyword).await,
            Err(error) => AsyncOperation::failed(error),
        }
    }

    /// Stop keyword spotting; trivially successful if not running
    pub async fn stop_keyword_recognition(&self) -> AsyncOperation<()> {
        let session = self.default_session.lock().await.clone();
        match session {
            Some(session) => session.stop_keyword().await,
            None => AsyncOperation::completed(()),
        }
    }

    /// Re-broadcast a session-started notification to subscribers
    pub fn fire_session_started(&self, session_id: &str) {
        self.fire(RecognizerEvent::SessionStarted {
            session_id: session_id.to_string(),
        });
    }

    /// Re-broadcast a session-stopped notification to subscribers
    pub fn fire_session_stopped(&self, session_id: &str) {
        self.fire(RecognizerEvent::SessionStopped {
            session_id: session_id.to_string(),
        });
    }

    /// Re-broadcast a speech-start notification to subscribers
    pub fn fire_speech_start_detected(&self, session_id: &str) {
        self.fire(RecognizerEvent::SpeechStartDetected {
            session_id: session_id.to_string(),
        });
    }

    /// Re-broadcast a speech-end notification to subscribers
    pub fn fire_speech_end_detected(&self, session_id: &str) {
        self.fire(RecognizerEvent::SpeechEndDetected {
            session_id: session_id.to_string(),
        });
    }

    /// Re-broadcast a recognition result to subscribers
    pub fn fire_result_event(&self, session_id: &str, result: RecognitionResult) {
        self.fire(RecognizerEvent::Result {
            session_id: session_id.to_string(),
            result,
        });
    }

    fn fire(&self, event: RecognizerEvent) {
        debug!("Recognizer event: {:?}", event);
        // A send error just means nobody is subscribed right now
        let _ = self.events.send(event);
    }
}

impl Default for Recognizer {
    fn default() -> Self {
        Self::new()
    }
}
