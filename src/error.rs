use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure raised by a capture, translation, or playback
/// boundary.
///
/// Every asynchronous capability call maps its failure into one of these
/// kinds at the point where the call was issued; raw provider error text
/// is never inspected downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No speech recognizer exists on this platform.
    #[error("speech capture is not available on this platform")]
    CaptureUnsupported,

    /// The user or OS denied microphone access.
    #[error("microphone access was denied")]
    CapturePermissionDenied,

    /// No audio input device, or the device failed.
    #[error("no audio input device is available")]
    CaptureDeviceUnavailable,

    /// The capture cycle timed out without hearing anything.
    #[error("no speech was detected")]
    NoSpeechDetected,

    /// Transport failure while reaching the provider or publishing.
    #[error("network failure while contacting the service")]
    NetworkError,

    /// The translation provider rejected the configured credential.
    #[error("the translation service rejected the configured credential")]
    InvalidCredential,

    /// The translation provider's rate or usage limit was hit.
    #[error("the translation service quota has been exhausted")]
    QuotaExceeded,

    /// Any other provider failure.
    #[error("the translation service returned an unexpected error")]
    GenericProviderError,
}

impl ErrorKind {
    /// Whether the notice for this kind stays up until replaced instead of
    /// auto-dismissing. A missing capture capability cannot be fixed by
    /// waiting, so its notice does not clear on its own.
    pub fn is_persistent(&self) -> bool {
        matches!(self, ErrorKind::CaptureUnsupported)
    }
}
