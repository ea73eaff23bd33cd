use super::TextToSpeech;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

/// Owns the single "currently speaking" slot for the process.
///
/// A new `say` preempts whatever is in flight: the waiting task is
/// aborted and the backend stopped before the next utterance is
/// dispatched, so a preempted utterance's completion is never observed.
#[derive(Clone)]
pub struct Speaker {
    backend: Arc<dyn TextToSpeech>,
    current: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Speaker {
    pub fn new(backend: Arc<dyn TextToSpeech>) -> Self {
        Self {
            backend,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Dispatch an utterance, cancelling any in progress. Does not wait
    /// for completion; a synthesis failure is logged at this boundary,
    /// not surfaced.
    pub async fn say(&self, text: &str, locale: &str) {
        let mut current = self.current.lock().await;
        if let Some(handle) = current.take() {
            handle.abort();
            self.backend.stop().await;
        }

        let backend = Arc::clone(&self.backend);
        let text = text.to_string();
        let locale = locale.to_string();
        *current = Some(tokio::spawn(async move {
            if let Err(kind) = backend.speak(&text, &locale).await {
                warn!("synthesis failed: {}", kind);
            }
        }));
    }

    /// Cancel the current utterance without starting another.
    pub async fn stop(&self) {
        let mut current = self.current.lock().await;
        if let Some(handle) = current.take() {
            handle.abort();
        }
        self.backend.stop().await;
    }

    pub fn is_speaking(&self) -> bool {
        self.backend.is_speaking()
    }
}
