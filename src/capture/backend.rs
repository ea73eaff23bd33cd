use crate::error::ErrorKind;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Events emitted by a capture backend during one listen cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Interim transcript for live preview; zero or more may arrive.
    Partial(String),

    /// The cycle's single final transcript.
    Final(String),

    /// The cycle failed; no final transcript will follow. Covers runtime
    /// recognizer errors and the no-speech timeout.
    Failed(ErrorKind),
}

/// Speech capture capability.
///
/// A cycle begins with `start` and ends when the returned receiver
/// yields `Final` or `Failed`, or closes without either because `stop`
/// discarded the cycle.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Begin listening in the given locale.
    ///
    /// Fails immediately with `CaptureUnsupported` when no recognizer
    /// exists on this platform, and with `CapturePermissionDenied` /
    /// `CaptureDeviceUnavailable` when the runtime refuses the
    /// microphone.
    async fn start(&self, locale: &str) -> Result<mpsc::Receiver<CaptureEvent>, ErrorKind>;

    /// Abort the current cycle, if any, discarding pending results.
    async fn stop(&self);

    /// Whether a cycle is currently listening.
    fn is_listening(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &str;
}
