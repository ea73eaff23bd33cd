use crate::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

/// Lifecycle of one speaker slot.
///
/// `Idle` and `Error` are resting states. A cycle walks
/// `Listening → Processing → Speaking` and settles back to `Idle`; any
/// failure along the way lands in `Error`, which resets to `Idle` after
/// the notice display window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Idle,
    Listening,
    Processing,
    Speaking,
    Error(ErrorKind),
}

impl ChannelState {
    /// Whether this state blocks another slot from starting. Only the
    /// capture-owning phases do; `Speaking` has already released the
    /// microphone.
    pub fn is_active(&self) -> bool {
        matches!(self, ChannelState::Listening | ChannelState::Processing)
    }
}

/// Rejected state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capture slot {slot} cannot move from {from:?} to {to:?}")]
pub struct TransitionError {
    pub slot: String,
    pub from: ChannelState,
    pub to: ChannelState,
}

/// One independently controllable microphone slot.
///
/// All mutation goes through the transition methods so every legal state
/// change is enumerable. Each cycle gets a monotonically increasing id;
/// completions arriving with a stale id are refused (the methods return
/// `false`), which is how results from a cancelled cycle are dropped
/// instead of applied.
#[derive(Debug)]
pub struct CaptureChannel {
    slot: String,
    language: String,
    state: ChannelState,
    cycle: u64,
    live_transcript: Option<String>,
    last_transcript: Option<String>,
    last_translation: Option<String>,
}

/// Serializable view of a channel for status reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    pub slot: String,
    pub language: String,
    pub state: ChannelState,
    pub live_transcript: Option<String>,
    pub last_transcript: Option<String>,
    pub last_translation: Option<String>,
}

impl CaptureChannel {
    pub fn new(slot: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            language: language.into(),
            state: ChannelState::Idle,
            cycle: 0,
            live_transcript: None,
            last_transcript: None,
            last_translation: None,
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Change the slot's language. Takes effect on the next cycle.
    pub fn set_language(&mut self, code: impl Into<String>) {
        self.language = code.into();
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Open a new cycle: `Idle → Listening`. Returns the cycle id that
    /// every asynchronous completion for this cycle must carry.
    pub fn begin_listening(&mut self) -> Result<u64, TransitionError> {
        if self.state != ChannelState::Idle {
            return Err(self.refuse(ChannelState::Listening));
        }
        self.cycle += 1;
        self.state = ChannelState::Listening;
        self.live_transcript = None;
        Ok(self.cycle)
    }

    /// Record an interim transcript for live preview. Ignored when the
    /// cycle is stale or the channel is no longer listening.
    pub fn preview(&mut self, cycle: u64, text: impl Into<String>) {
        if cycle == self.cycle && self.state == ChannelState::Listening {
            self.live_transcript = Some(text.into());
        }
    }

    /// Accept the final transcript: `Listening → Processing`. Returns
    /// `false` (and changes nothing) when the cycle is stale.
    pub fn finish_listening(&mut self, cycle: u64, transcript: &str) -> bool {
        if cycle != self.cycle || self.state != ChannelState::Listening {
            return false;
        }
        self.state = ChannelState::Processing;
        self.live_transcript = None;
        self.last_transcript = Some(transcript.to_string());
        true
    }

    /// Accept the translation result: `Processing → Speaking`.
    pub fn complete(&mut self, cycle: u64, translation: Option<String>) -> bool {
        if cycle != self.cycle || self.state != ChannelState::Processing {
            return false;
        }
        self.state = ChannelState::Speaking;
        self.last_translation = translation;
        true
    }

    /// Close the cycle once playback has been dispatched:
    /// `Speaking → Idle`.
    pub fn settle(&mut self, cycle: u64) -> bool {
        if cycle != self.cycle || self.state != ChannelState::Speaking {
            return false;
        }
        self.state = ChannelState::Idle;
        true
    }

    /// Record a failure: `Listening|Processing → Error(kind)`.
    pub fn fail(&mut self, cycle: u64, kind: ErrorKind) -> bool {
        if cycle != self.cycle || !self.state.is_active() {
            return false;
        }
        self.state = ChannelState::Error(kind);
        self.live_transcript = None;
        true
    }

    /// Reset a failed channel once its notice window has elapsed:
    /// `Error → Idle`.
    pub fn recover(&mut self, cycle: u64) -> bool {
        if cycle != self.cycle || !matches!(self.state, ChannelState::Error(_)) {
            return false;
        }
        self.state = ChannelState::Idle;
        true
    }

    /// Abandon whatever is in flight and return to `Idle` with no error
    /// surfaced. Bumps the cycle so late completions go stale. Calling
    /// this on an idle channel is a no-op.
    pub fn cancel(&mut self) {
        if self.state == ChannelState::Idle {
            return;
        }
        self.cycle += 1;
        self.state = ChannelState::Idle;
        self.live_transcript = None;
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            slot: self.slot.clone(),
            language: self.language.clone(),
            state: self.state,
            live_transcript: self.live_transcript.clone(),
            last_transcript: self.last_transcript.clone(),
            last_translation: self.last_translation.clone(),
        }
    }

    fn refuse(&self, to: ChannelState) -> TransitionError {
        TransitionError {
            slot: self.slot.clone(),
            from: self.state,
            to,
        }
    }
}
