//! NATS-backed session transport.
//!
//! All session events travel on a single well-known subject; filtering
//! by session id happens on the subscriber side. NATS core pub/sub gives
//! exactly the semantics the session layer assumes: at-most-once, no
//! acknowledgment, ordered per publisher.

use super::event::SessionEvent;
use super::transport::EventTransport;
use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Subject shared by every participant of the application instance.
pub const DEFAULT_SUBJECT: &str = "talkbridge.session.events";

pub struct NatsTransport {
    client: Client,
    subject: String,
}

impl NatsTransport {
    /// Connect to a NATS server.
    pub async fn connect(url: &str, subject: impl Into<String>) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject: subject.into(),
        })
    }
}

#[async_trait]
impl EventTransport for NatsTransport {
    async fn send(&self, event: &SessionEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .context("Failed to publish session event")?;

        debug!(
            "Published {} event for session {} to {}",
            event.kind.name(),
            event.session_id,
            self.subject
        );

        Ok(())
    }

    async fn events(&self) -> Result<mpsc::Receiver<SessionEvent>> {
        let mut subscriber = self
            .client
            .subscribe(self.subject.clone())
            .await
            .context("Failed to subscribe to session events")?;

        info!("Subscribed to {}", self.subject);

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<SessionEvent>(&msg.payload) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse session event: {}", e);
                    }
                }
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "nats"
    }
}
