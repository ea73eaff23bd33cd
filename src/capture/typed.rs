//! Text-entry capture backend.
//!
//! Typed text takes the same path as spoken input: submitting a line
//! ends the open cycle with that text as its final transcript. Used by
//! the HTTP API and by headless deployments with no recognizer.

use super::backend::{CaptureBackend, CaptureEvent};
use crate::error::ErrorKind;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, Mutex};

pub struct TypedCapture {
    /// Sender side of the open cycle, if one is listening
    cycle_tx: Mutex<Option<mpsc::Sender<CaptureEvent>>>,
    listening: AtomicBool,
}

impl TypedCapture {
    pub fn new() -> Self {
        Self {
            cycle_tx: Mutex::new(None),
            listening: AtomicBool::new(false),
        }
    }

    /// Feed typed text into the open cycle as its final transcript.
    /// Returns `false` when no cycle is listening.
    pub async fn submit(&self, text: &str) -> bool {
        let tx = self.cycle_tx.lock().await.take();
        match tx {
            Some(tx) => {
                self.listening.store(false, Ordering::SeqCst);
                tx.send(CaptureEvent::Final(text.to_string())).await.is_ok()
            }
            None => false,
        }
    }

    /// Feed an interim preview without ending the cycle.
    pub async fn preview(&self, text: &str) -> bool {
        let guard = self.cycle_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx
                .send(CaptureEvent::Partial(text.to_string()))
                .await
                .is_ok(),
            None => false,
        }
    }
}

impl Default for TypedCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for TypedCapture {
    async fn start(&self, _locale: &str) -> Result<mpsc::Receiver<CaptureEvent>, ErrorKind> {
        let (tx, rx) = mpsc::channel(8);
        // Opening a new cycle drops any previous sender, closing the old
        // receiver without a final result.
        *self.cycle_tx.lock().await = Some(tx);
        self.listening.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&self) {
        self.cycle_tx.lock().await.take();
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "typed"
    }
}
