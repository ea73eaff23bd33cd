//! Shared-session synchronization.
//!
//! This module provides:
//! - The `SessionEvent` wire type carried between participants
//! - The `EventTransport` boundary over the shared best-effort channel,
//!   with NATS and in-process implementations
//! - The `SessionBus` fan-out with an ordered local handler registry
//! - `SessionRoster`, each client's derived view of who is present
//!
//! Delivery is at-most-once with no acknowledgment: an event may be lost
//! when a subscriber is not running, and ordering holds per sender only.

mod bus;
mod event;
mod nats;
mod roster;
mod transport;

pub use bus::{EventHandler, SessionBus, SubscriptionId};
pub use event::{EventKind, Participant, SessionEvent};
pub use nats::{NatsTransport, DEFAULT_SUBJECT};
pub use roster::SessionRoster;
pub use transport::{EventTransport, LocalTransport};
