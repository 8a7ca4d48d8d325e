use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info};

use super::{EngineEvent, EngineRequest, RecognitionEngine, RecognitionMode};
use crate::events::RecognitionResult;

/// Scripted recognition engine for tests and demos.
///
/// Each run emits `SpeechStart`, one result per configured phrase,
/// `SpeechEnd`, then either completes (single-shot) or idles until `stop()`
/// (continuous and keyword modes).
pub struct MockEngine {
    phrases: Vec<String>,
    fail_with: Option<String>,
    emit_partials: bool,
    latency: Duration,
    running: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
}

impl MockEngine {
    /// Engine that recognizes the given phrases, in order
    pub fn new(phrases: Vec<String>) -> Self {
        Self {
            phrases,
            fail_with: None,
            emit_partials: false,
            latency: Duration::from_millis(5),
            running: Arc::new(AtomicBool::new(false)),
            stop_notify: Arc::new(Notify::new()),
        }
    }

    /// Engine whose runs abort with the given error message
    pub fn failing(message: impl Into<String>) -> Self {
        let mut engine = Self::new(Vec::new());
        engine.fail_with = Some(message.into());
        engine
    }

    /// Emit a partial hypothesis before each final result
    pub fn with_partials(mut self) -> Self {
        self.emit_partials = true;
        self
    }

    /// Delay before the first event of each run
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait::async_trait]
impl RecognitionEngine for MockEngine {
    async fn start(&mut self, request: EngineRequest) -> Result<mpsc::Receiver<EngineEvent>> {
        if self.running.load(Ordering::SeqCst) {
            anyhow::bail!("mock engine already has an active run");
        }

        info!(
            "Mock engine starting {:?} run for session {}",
            request.mode, request.session_id
        );

        let (tx, rx) = mpsc::channel(32);
        let phrases = self.phrases.clone();
        let fail_with = self.fail_with.clone();
        let emit_partials = self.emit_partials;
        let latency = self.latency;
        let running = Arc::clone(&self.running);
        let stop_notify = Arc::clone(&self.stop_notify);

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;

            if let Some(message) = fail_with {
                let _ = tx.send(EngineEvent::Failed(message)).await;
                running.store(false, Ordering::SeqCst);
                return;
            }

            // Receiver dropped means the session tore down; just end the run
            if tx.send(EngineEvent::SpeechStart).await.is_err() {
                running.store(false, Ordering::SeqCst);
                return;
            }

            for phrase in &phrases {
                if emit_partials {
                    let partial = RecognitionResult::partial_text(phrase.clone());
                    if tx.send(EngineEvent::Result(partial)).await.is_err() {
                        break;
                    }
                }
                let result = RecognitionResult::final_text(phrase.clone(), Some(0.95));
                if tx.send(EngineEvent::Result(result)).await.is_err() {
                    break;
                }
            }

            let _ = tx.send(EngineEvent::SpeechEnd).await;

            if request.mode != RecognitionMode::SingleShot {
                // Idle until stop() flips the flag
                while running.load(Ordering::SeqCst) && !tx.is_closed() {
                    stop_notify.notified().await;
                }
            }

            debug!("Mock engine run for session {} winding down", request.session_id);
            let _ = tx.send(EngineEvent::Completed).await;
            running.store(false, Ordering::SeqCst);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        self.stop_notify.notify_one();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
