//! Speech synthesis.
//!
//! The `TextToSpeech` trait is the capability boundary a platform
//! synthesizer implements; `Speaker` owns the process-wide rule that at
//! most one utterance is in flight.

mod speaker;

pub use speaker::Speaker;

use crate::error::ErrorKind;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Speech synthesis capability.
///
/// Voice choice is the backend's concern: the best available voice whose
/// locale prefix matches wins, and a missing match falls back to the
/// default voice rather than erroring.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize and play `text`. Resolves when the utterance finishes.
    async fn speak(&self, text: &str, locale: &str) -> Result<(), ErrorKind>;

    /// Cancel the utterance in progress, if any. Never errors.
    async fn stop(&self);

    /// Whether an utterance is currently playing.
    fn is_speaking(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Synthesis backend that narrates utterances to the log instead of an
/// audio device. Used by headless deployments.
pub struct ConsolePlayback {
    speaking: AtomicBool,
}

impl ConsolePlayback {
    pub fn new() -> Self {
        Self {
            speaking: AtomicBool::new(false),
        }
    }
}

impl Default for ConsolePlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextToSpeech for ConsolePlayback {
    async fn speak(&self, text: &str, locale: &str) -> Result<(), ErrorKind> {
        self.speaking.store(true, Ordering::SeqCst);
        info!("[{}] {}", locale, text);
        self.speaking.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "console"
    }
}
