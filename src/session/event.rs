use crate::conversation::Message;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A participant in a shared session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub display_name: String,

    /// Short code of the language this participant wants to hear
    pub preferred_language: String,
}

/// Event payload, tagged by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventKind {
    #[serde(rename = "JOIN")]
    Join { participant: Participant },

    #[serde(rename = "MESSAGE")]
    Message { message: Message },

    #[serde(rename = "LEAVE")]
    Leave {},

    #[serde(rename = "UPDATE_LANG")]
    UpdateLang { language: String },
}

impl EventKind {
    /// Wire name of the event type, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Join { .. } => "JOIN",
            EventKind::Message { .. } => "MESSAGE",
            EventKind::Leave {} => "LEAVE",
            EventKind::UpdateLang { .. } => "UPDATE_LANG",
        }
    }
}

/// The atomic unit of cross-participant synchronization.
///
/// Immutable once created. All participants share one transport topic,
/// so consumers filter by `session_id` (and drop their own `sender_id`)
/// themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    #[serde(flatten)]
    pub kind: EventKind,

    pub session_id: String,
    pub sender_id: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl SessionEvent {
    pub fn new(
        session_id: impl Into<String>,
        sender_id: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            kind,
            session_id: session_id.into(),
            sender_id: sender_id.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
