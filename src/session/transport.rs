use super::event::SessionEvent;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

/// Best-effort fan-out transport shared by every participant of the
/// application instance.
///
/// At-most-once: a send is never acknowledged and is lost when a
/// subscriber is not running. Ordering holds per sender only. Depending
/// on the transport, a process may receive echoes of its own sends;
/// subscribers drop those by `sender_id`.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Fire-and-forget publish. An error here means the transport itself
    /// failed, not that delivery was missed.
    async fn send(&self, event: &SessionEvent) -> Result<()>;

    /// Open a feed of events arriving on the shared topic.
    async fn events(&self) -> Result<mpsc::Receiver<SessionEvent>>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// In-process transport backed by a broadcast channel.
///
/// Connects several orchestrators running in one process (and is what
/// the integration tests run on). Like the networked transports, it
/// echoes a sender's own events back to its subscribers.
pub struct LocalTransport {
    tx: broadcast::Sender<SessionEvent>,
}

impl LocalTransport {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventTransport for LocalTransport {
    async fn send(&self, event: &SessionEvent) -> Result<()> {
        // No subscribers is not a failure; the event is simply lost.
        let _ = self.tx.send(event.clone());
        Ok(())
    }

    async fn events(&self) -> Result<mpsc::Receiver<SessionEvent>> {
        let mut feed = self.tx.subscribe();
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("event feed lagged, dropped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &str {
        "local"
    }
}
