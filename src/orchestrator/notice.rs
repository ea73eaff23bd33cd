use crate::error::ErrorKind;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A session-scoped error notice shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,

    /// Milliseconds since the Unix epoch
    pub raised_at: i64,

    /// Persistent notices stay until replaced or dismissed
    pub persistent: bool,
}

/// Holds the currently displayed notice and clears it after the display
/// window, no user action required. Persistent notices (a missing
/// capture capability) stay until replaced or explicitly dismissed.
#[derive(Clone)]
pub struct NoticeBoard {
    current: Arc<Mutex<Option<Notice>>>,
    seq: Arc<AtomicU64>,
    display: Duration,
}

impl NoticeBoard {
    pub fn new(display: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            seq: Arc::new(AtomicU64::new(0)),
            display,
        }
    }

    /// Display a notice for the given error kind, replacing any current
    /// one. Transient notices self-clear after the display window unless
    /// a newer notice has taken their place.
    pub async fn raise(&self, kind: ErrorKind) {
        let notice = Notice {
            kind,
            message: kind.to_string(),
            raised_at: Utc::now().timestamp_millis(),
            persistent: kind.is_persistent(),
        };

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.lock().await = Some(notice.clone());

        if !notice.persistent {
            let board = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(board.display).await;
                let mut current = board.current.lock().await;
                if board.seq.load(Ordering::SeqCst) == seq {
                    *current = None;
                }
            });
        }
    }

    pub async fn current(&self) -> Option<Notice> {
        self.current.lock().await.clone()
    }

    /// Clear the board immediately (the user closed the notice).
    pub async fn dismiss(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().await = None;
    }
}
