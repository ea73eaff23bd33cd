use super::event::SessionEvent;
use super::transport::EventTransport;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handler invoked for every event received from the transport.
pub type EventHandler = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Identifier returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Fans session events out between the shared transport and local
/// subscribers.
///
/// Handlers are kept in subscription order and invoked synchronously for
/// each received event; the bus never batches or coalesces. It also never
/// filters a publisher's own events; subscribers compare `sender_id`
/// themselves.
pub struct SessionBus {
    transport: Arc<dyn EventTransport>,
    handlers: Arc<Mutex<Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SessionBus {
    /// Open the transport feed and start dispatching to subscribers.
    pub async fn start(transport: Arc<dyn EventTransport>) -> Result<Arc<Self>> {
        info!("Starting session bus over {} transport", transport.name());

        let bus = Arc::new(Self {
            transport,
            handlers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
            pump: Mutex::new(None),
        });

        let mut feed = bus.transport.events().await?;
        let handlers = Arc::clone(&bus.handlers);
        let pump = tokio::spawn(async move {
            while let Some(event) = feed.recv().await {
                let handlers = handlers.lock().await;
                for (_, handler) in handlers.iter() {
                    handler(&event);
                }
            }
            debug!("Session bus feed closed");
        });

        *bus.pump.lock().await = Some(pump);

        Ok(bus)
    }

    /// Fire-and-forget publish onto the shared transport. No delivery
    /// guarantee: an error means the transport itself failed.
    pub async fn publish(&self, event: SessionEvent) -> Result<()> {
        self.transport.send(&event).await
    }

    /// Register a handler. Handlers are invoked in subscription order.
    pub async fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().await.push((id, handler));
        id
    }

    /// Remove a handler. Returns `false` when the id was not registered.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().await;
        let before = handlers.len();
        handlers.retain(|(registered, _)| *registered != id);
        handlers.len() != before
    }

    /// Stop dispatching and drop all handlers.
    pub async fn shutdown(&self) {
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        self.handlers.lock().await.clear();
    }
}
