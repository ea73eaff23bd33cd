use super::event::{EventKind, Participant, SessionEvent};
use std::collections::HashMap;

/// One client's view of who is in the session.
///
/// There is no authoritative server: membership is derived from the
/// JOIN / LEAVE / UPDATE_LANG events this client has observed, so views
/// across clients converge only as events propagate.
#[derive(Debug, Clone, Default)]
pub struct SessionRoster {
    participants: HashMap<String, Participant>,
}

impl SessionRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observed event into the membership view.
    pub fn apply(&mut self, event: &SessionEvent) {
        match &event.kind {
            EventKind::Join { participant } => {
                self.participants
                    .insert(participant.id.clone(), participant.clone());
            }
            EventKind::Leave {} => {
                self.participants.remove(&event.sender_id);
            }
            EventKind::UpdateLang { language } => {
                if let Some(participant) = self.participants.get_mut(&event.sender_id) {
                    participant.preferred_language = language.clone();
                }
            }
            EventKind::Message { .. } => {}
        }
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Participants in id order, for stable reporting.
    pub fn participants(&self) -> Vec<Participant> {
        let mut all: Vec<Participant> = self.participants.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// The single remote peer, when exactly one other participant is
    /// present. Message translation targets this peer's language.
    pub fn sole_peer(&self, local_id: &str) -> Option<&Participant> {
        let mut others = self.participants.values().filter(|p| p.id != local_id);
        match (others.next(), others.next()) {
            (Some(peer), None) => Some(peer),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
