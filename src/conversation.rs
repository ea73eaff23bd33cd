//! Conversation log types.
//!
//! A conversation is an ordered, append-only sequence of messages.
//! Insertion order is display order; entries are never altered or
//! removed while the session lives, which makes concurrent appends from
//! the capture path and the session-inbound path safe without further
//! coordination.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A single utterance, in the speaker's language, with its translation
/// for the listener when one was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,

    /// What the speaker actually said, in their own language
    pub text: String,

    /// Translation for the listener, absent when none was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    /// Slot id in a co-located conversation, participant id in a session
    pub sender_id: String,

    /// Short code of the language `text` is in
    pub language_code: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    pub fn new(
        text: impl Into<String>,
        translation: Option<String>,
        sender_id: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            translation,
            sender_id: sender_id.into(),
            language_code: language_code.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Append-only record of the conversation, shared between the capture
/// path and the session-inbound path.
#[derive(Clone, Default)]
pub struct ConversationLog {
    entries: Arc<Mutex<Vec<Message>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Appending is the only mutation the log supports.
    pub async fn append(&self, message: Message) {
        self.entries.lock().await.push(message);
    }

    /// Clone of the full log in insertion order.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
