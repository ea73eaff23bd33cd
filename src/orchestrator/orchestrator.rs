use super::config::OrchestratorConfig;
use super::notice::{Notice, NoticeBoard};
use crate::capture::{CaptureBackend, CaptureChannel, CaptureEvent, ChannelSnapshot, ChannelState};
use crate::conversation::{ConversationLog, Message};
use crate::error::ErrorKind;
use crate::language;
use crate::playback::{Speaker, TextToSpeech};
use crate::session::{
    EventKind, Participant, SessionBus, SessionEvent, SessionRoster, SubscriptionId,
};
use crate::translation::Translator;
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capability implementations injected into the orchestrator.
///
/// Built once at startup and handed in explicitly; nothing in here is
/// ambient or global state.
pub struct Capabilities {
    pub capture: Arc<dyn CaptureBackend>,
    pub translator: Arc<dyn Translator>,
    pub synthesis: Arc<dyn TextToSpeech>,
}

/// Attachment to a shared session while joined.
struct SessionHandle {
    id: String,
    bus: Arc<SessionBus>,
    subscription: SubscriptionId,
    roster: SessionRoster,
}

/// Coordinates capture channels, translation, playback, and (in session
/// mode) the session bus.
///
/// Owns the rule that at most one channel may hold the microphone, the
/// capture→translate→speak cycle, the error policy, and the inbound path
/// for messages from remote participants. Lock order, where locks nest,
/// is channels → capture_tasks → session.
pub struct Orchestrator {
    capabilities: Capabilities,
    config: OrchestratorConfig,
    channels: Mutex<HashMap<String, CaptureChannel>>,
    capture_tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    log: ConversationLog,
    speaker: Speaker,
    notices: NoticeBoard,
    session: Mutex<Option<SessionHandle>>,
    local: Mutex<Participant>,
    inbound_task: Mutex<Option<JoinHandle<()>>>,
}

/// Session part of a status report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: String,
    pub participants: Vec<Participant>,
}

/// Point-in-time view of the orchestrator for the control API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorStatus {
    pub channels: Vec<ChannelSnapshot>,
    pub notice: Option<Notice>,
    pub session: Option<SessionStatus>,
    pub speaking: bool,
    pub messages: usize,
}

impl Orchestrator {
    pub fn new(
        capabilities: Capabilities,
        config: OrchestratorConfig,
        local: Participant,
    ) -> Arc<Self> {
        let mut channels = HashMap::new();
        for slot in &config.slots {
            channels.insert(
                slot.id.clone(),
                CaptureChannel::new(slot.id.clone(), slot.language.clone()),
            );
        }

        let speaker = Speaker::new(Arc::clone(&capabilities.synthesis));
        let notices = NoticeBoard::new(config.error_display);

        Arc::new(Self {
            capabilities,
            config,
            channels: Mutex::new(channels),
            capture_tasks: Mutex::new(HashMap::new()),
            log: ConversationLog::new(),
            speaker,
            notices,
            session: Mutex::new(None),
            local: Mutex::new(local),
            inbound_task: Mutex::new(None),
        })
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub async fn local_participant(&self) -> Participant {
        self.local.lock().await.clone()
    }

    pub async fn channel_state(&self, slot: &str) -> Option<ChannelState> {
        self.channels.lock().await.get(slot).map(|c| c.state())
    }

    /// Begin a capture cycle on `slot`.
    ///
    /// Any other slot currently listening or processing is cancelled
    /// first; starting the slot that is already listening toggles it off.
    /// Capability failures do not error this call; they surface through
    /// the channel's error state and the notice board.
    pub async fn start_capture(self: &Arc<Self>, slot: &str) -> Result<()> {
        let (cycle, lang) = {
            let mut channels = self.channels.lock().await;
            if !channels.contains_key(slot) {
                bail!("unknown capture slot: {}", slot);
            }

            // Pressing capture on the listening slot toggles it off.
            if channels.get(slot).is_some_and(|c| c.is_active()) {
                self.capabilities.capture.stop().await;
                self.abort_capture_task(slot).await;
                if let Some(channel) = channels.get_mut(slot) {
                    channel.cancel();
                }
                return Ok(());
            }

            // Mutual exclusion: silence every other active slot first.
            let active: Vec<String> = channels
                .values()
                .filter(|c| c.slot() != slot && c.is_active())
                .map(|c| c.slot().to_string())
                .collect();
            if !active.is_empty() {
                self.capabilities.capture.stop().await;
            }
            for other in active {
                info!("Cancelling capture on slot {} to start {}", other, slot);
                self.abort_capture_task(&other).await;
                if let Some(channel) = channels.get_mut(&other) {
                    channel.cancel();
                }
            }

            let Some(channel) = channels.get_mut(slot) else {
                bail!("unknown capture slot: {}", slot);
            };
            // Starting again after a failure is the re-initiation that
            // clears the resting error state.
            if matches!(channel.state(), ChannelState::Error(_)) {
                channel.cancel();
            }
            let cycle = channel.begin_listening()?;
            (cycle, channel.language().to_string())
        };

        match self
            .capabilities
            .capture
            .start(language::locale_for(&lang))
            .await
        {
            Ok(events) => {
                info!("Slot {} listening ({})", slot, lang);
                let orchestrator = Arc::clone(self);
                let slot_owned = slot.to_string();
                let task = tokio::spawn(async move {
                    orchestrator.run_capture_cycle(slot_owned, cycle, events).await;
                });
                self.capture_tasks.lock().await.insert(slot.to_string(), task);
            }
            Err(kind) => self.fail_cycle(slot, cycle, kind).await,
        }

        Ok(())
    }

    /// Abandon whatever `slot` has in flight. Idempotent: cancelling an
    /// idle slot changes nothing.
    pub async fn cancel_capture(&self, slot: &str) -> Result<()> {
        let mut channels = self.channels.lock().await;
        let Some(channel) = channels.get_mut(slot) else {
            bail!("unknown capture slot: {}", slot);
        };
        if channel.is_active() {
            self.capabilities.capture.stop().await;
        }
        channel.cancel();
        self.abort_capture_task(slot).await;
        Ok(())
    }

    /// Change the language captured on a slot. Takes effect on the next
    /// cycle.
    pub async fn set_slot_language(&self, slot: &str, code: &str) -> Result<()> {
        if language::find(code).is_none() {
            bail!("unknown language code: {}", code);
        }
        let mut channels = self.channels.lock().await;
        let Some(channel) = channels.get_mut(slot) else {
            bail!("unknown capture slot: {}", slot);
        };
        channel.set_language(code);
        Ok(())
    }

    /// Change the local participant's preferred language and announce it
    /// to the session, if joined.
    pub async fn update_language(self: &Arc<Self>, code: &str) -> Result<()> {
        if language::find(code).is_none() {
            bail!("unknown language code: {}", code);
        }
        {
            let mut local = self.local.lock().await;
            local.preferred_language = code.to_string();
        }

        // In a single-slot deployment the capture slot follows the
        // speaker's language.
        if self.config.slots.len() == 1 {
            let mut channels = self.channels.lock().await;
            if let Some(channel) = channels.values_mut().next() {
                channel.set_language(code);
            }
        }

        let local_id = self.local.lock().await.id.clone();
        let announce = {
            let mut session = self.session.lock().await;
            session.as_mut().map(|handle| {
                let event = SessionEvent::new(
                    handle.id.clone(),
                    local_id.clone(),
                    EventKind::UpdateLang {
                        language: code.to_string(),
                    },
                );
                handle.roster.apply(&event);
                (Arc::clone(&handle.bus), event)
            })
        };
        if let Some((bus, event)) = announce {
            if let Err(e) = bus.publish(event).await {
                warn!("Failed to publish language update: {}", e);
                self.notices.raise(ErrorKind::NetworkError).await;
            }
        }

        Ok(())
    }

    /// Join a shared session: subscribe to the bus, announce JOIN, and
    /// start the inbound message path. Leaves any current session first.
    pub async fn join_session(
        self: &Arc<Self>,
        bus: Arc<SessionBus>,
        session_id: impl Into<String>,
    ) -> Result<()> {
        let session_id = session_id.into();
        self.leave_session().await?;

        let local = self.local.lock().await.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = bus
            .subscribe(Box::new(move |event: &SessionEvent| {
                let _ = tx.send(event.clone());
            }))
            .await;

        let join = SessionEvent::new(
            session_id.clone(),
            local.id.clone(),
            EventKind::Join {
                participant: local.clone(),
            },
        );
        let mut roster = SessionRoster::new();
        roster.apply(&join);

        if let Err(e) = bus.publish(join).await {
            warn!("Failed to announce session join: {}", e);
            self.notices.raise(ErrorKind::NetworkError).await;
        }

        *self.session.lock().await = Some(SessionHandle {
            id: session_id.clone(),
            bus,
            subscription,
            roster,
        });

        let orchestrator = Arc::clone(self);
        *self.inbound_task.lock().await = Some(tokio::spawn(orchestrator.run_inbound(rx)));

        info!("Joined session {} as {}", session_id, local.display_name);
        Ok(())
    }

    /// Announce LEAVE and detach from the session. No-op when not joined.
    pub async fn leave_session(&self) -> Result<()> {
        let Some(handle) = self.session.lock().await.take() else {
            return Ok(());
        };
        let local_id = self.local.lock().await.id.clone();

        let leave = SessionEvent::new(handle.id.clone(), local_id, EventKind::Leave {});
        if let Err(e) = handle.bus.publish(leave).await {
            warn!("Failed to announce session leave: {}", e);
        }
        handle.bus.unsubscribe(handle.subscription).await;

        if let Some(task) = self.inbound_task.lock().await.take() {
            task.abort();
        }

        info!("Left session {}", handle.id);
        Ok(())
    }

    /// Point-in-time view for the control API.
    pub async fn status(&self) -> OrchestratorStatus {
        let snapshots = {
            let channels = self.channels.lock().await;
            self.config
                .slots
                .iter()
                .filter_map(|slot| channels.get(&slot.id).map(|c| c.snapshot()))
                .collect()
        };

        let session = {
            let session = self.session.lock().await;
            session.as_ref().map(|handle| SessionStatus {
                session_id: handle.id.clone(),
                participants: handle.roster.participants(),
            })
        };

        OrchestratorStatus {
            channels: snapshots,
            notice: self.notices.current().await,
            session,
            speaking: self.speaker.is_speaking(),
            messages: self.log.len().await,
        }
    }

    async fn abort_capture_task(&self, slot: &str) {
        if let Some(task) = self.capture_tasks.lock().await.remove(slot) {
            task.abort();
        }
    }

    /// Drive one capture cycle's event feed until it yields a result or
    /// closes (cancelled).
    async fn run_capture_cycle(
        self: Arc<Self>,
        slot: String,
        cycle: u64,
        mut events: mpsc::Receiver<CaptureEvent>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                CaptureEvent::Partial(text) => {
                    let mut channels = self.channels.lock().await;
                    if let Some(channel) = channels.get_mut(&slot) {
                        channel.preview(cycle, text);
                    }
                }
                CaptureEvent::Final(text) => {
                    self.handle_final_transcript(&slot, cycle, text).await;
                    return;
                }
                CaptureEvent::Failed(kind) => {
                    self.fail_cycle(&slot, cycle, kind).await;
                    return;
                }
            }
        }
        debug!("Capture feed for slot {} closed without a result", slot);
    }

    /// Steps 3–4 of a capture cycle: translate, record, speak, publish.
    async fn handle_final_transcript(self: &Arc<Self>, slot: &str, cycle: u64, text: String) {
        if text.trim().is_empty() {
            debug!("Empty transcript on slot {}; abandoning cycle", slot);
            let mut channels = self.channels.lock().await;
            if let Some(channel) = channels.get_mut(slot) {
                if channel.cycle() == cycle {
                    channel.cancel();
                }
            }
            return;
        }

        let local = self.local.lock().await.clone();

        let (source_lang, target_lang, sender_id, publish_to) = {
            let mut channels = self.channels.lock().await;
            let source = {
                let Some(channel) = channels.get_mut(slot) else {
                    return;
                };
                if !channel.finish_listening(cycle, &text) {
                    debug!("Dropping stale final transcript for slot {}", slot);
                    return;
                }
                channel.language().to_string()
            };

            let session = self.session.lock().await;
            match session.as_ref() {
                // Session mode: translate for the sole remote peer when
                // one is known; otherwise publish untranslated and let
                // each receiver translate for itself.
                Some(handle) => {
                    let target = handle
                        .roster
                        .sole_peer(&local.id)
                        .map(|peer| peer.preferred_language.clone());
                    (
                        source,
                        target,
                        local.id.clone(),
                        Some((handle.id.clone(), Arc::clone(&handle.bus))),
                    )
                }
                // Co-located mode: the listener is the other slot.
                None => {
                    let target = channels
                        .iter()
                        .find(|(id, _)| id.as_str() != slot)
                        .map(|(_, channel)| channel.language().to_string());
                    (source, target, slot.to_string(), None)
                }
            }
        };

        info!("Transcript on slot {} ({}): {}", slot, source_lang, text);

        let translation = match &target_lang {
            Some(target) => match self.translate_bounded(&text, &source_lang, target).await {
                Ok(translated) => Some(translated),
                Err(kind) => {
                    self.fail_cycle(slot, cycle, kind).await;
                    return;
                }
            },
            None => None,
        };

        {
            let mut channels = self.channels.lock().await;
            let Some(channel) = channels.get_mut(slot) else {
                return;
            };
            if !channel.complete(cycle, translation.clone()) {
                debug!("Dropping stale translation for slot {}", slot);
                return;
            }
        }

        let message = Message::new(text, translation.clone(), sender_id.clone(), source_lang);
        self.log.append(message.clone()).await;

        if let (Some(translated), Some(target)) = (&translation, &target_lang) {
            self.speaker.say(translated, language::locale_for(target)).await;
        }

        if let Some((session_id, bus)) = publish_to {
            let event = SessionEvent::new(session_id, sender_id.clone(), EventKind::Message { message });
            if let Err(e) = bus.publish(event).await {
                warn!("Failed to publish message event: {}", e);
                self.notices.raise(ErrorKind::NetworkError).await;
            }
        }

        let mut channels = self.channels.lock().await;
        if let Some(channel) = channels.get_mut(slot) {
            channel.settle(cycle);
        }
    }

    /// Step 5: park the channel in its error state, surface the notice,
    /// and schedule the reset. One channel's failure never touches the
    /// other channels.
    async fn fail_cycle(self: &Arc<Self>, slot: &str, cycle: u64, kind: ErrorKind) {
        warn!("Capture cycle failed on slot {}: {}", slot, kind);
        {
            let mut channels = self.channels.lock().await;
            match channels.get_mut(slot) {
                Some(channel) => {
                    if !channel.fail(cycle, kind) {
                        // Stale failure; a newer cycle owns the slot.
                        return;
                    }
                }
                // Stale failure; a newer cycle owns the slot.
                None => return,
            }
        }
        self.notices.raise(kind).await;

        // After the display window the channel is idle again and a new
        // cycle can start without any explicit reset.
        let orchestrator = Arc::clone(self);
        let slot = slot.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(orchestrator.config.error_display).await;
            let mut channels = orchestrator.channels.lock().await;
            if let Some(channel) = channels.get_mut(&slot) {
                channel.recover(cycle);
            }
        });
    }

    /// Translation with the configured upper bound. Same-language targets
    /// reuse the source text without a provider call; blank input
    /// short-circuits to an empty result.
    async fn translate_bounded(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ErrorKind> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        if source == target {
            return Ok(text.to_string());
        }
        match tokio::time::timeout(
            self.config.translate_timeout,
            self.capabilities.translator.translate(text, source, target),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Translation timed out after {:?}",
                    self.config.translate_timeout
                );
                Err(ErrorKind::NetworkError)
            }
        }
    }

    async fn run_inbound(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_session_event(event).await;
        }
        debug!("Inbound session feed closed");
    }

    async fn handle_session_event(self: &Arc<Self>, event: SessionEvent) {
        let local = self.local.lock().await.clone();

        let relevant = {
            let mut session = self.session.lock().await;
            match session.as_mut() {
                // One shared topic carries every session; drop events for
                // other sessions and echoes of our own.
                Some(handle) if event.session_id == handle.id && event.sender_id != local.id => {
                    handle.roster.apply(&event);
                    true
                }
                _ => false,
            }
        };
        if !relevant {
            return;
        }

        match event.kind {
            EventKind::Message { message } => self.receive_message(message, &local).await,
            EventKind::Join { participant } => {
                info!(
                    "{} joined session {}",
                    participant.display_name, event.session_id
                );
            }
            EventKind::Leave {} => {
                info!(
                    "Participant {} left session {}",
                    event.sender_id, event.session_id
                );
            }
            EventKind::UpdateLang { language } => {
                info!(
                    "Participant {} switched language to {}",
                    event.sender_id, language
                );
            }
        }
    }

    /// Inbound message path: translate for the local participant when the
    /// sender did not, append, and play back. Runs independently of the
    /// capture channels.
    async fn receive_message(self: &Arc<Self>, message: Message, local: &Participant) {
        let preferred = local.preferred_language.clone();

        let translation = match &message.translation {
            Some(existing) => Some(existing.clone()),
            None if message.language_code != preferred => {
                match self
                    .translate_bounded(&message.text, &message.language_code, &preferred)
                    .await
                {
                    Ok(translated) => Some(translated),
                    Err(kind) => {
                        warn!("Failed to translate inbound message: {}", kind);
                        self.notices.raise(kind).await;
                        None
                    }
                }
            }
            None => None,
        };

        let spoken = translation
            .clone()
            .or_else(|| (message.language_code == preferred).then(|| message.text.clone()));

        // Translation is resolved before insertion; the log never updates
        // an entry in place.
        let stored = Message {
            translation,
            ..message
        };
        self.log.append(stored).await;

        if let Some(text) = spoken {
            self.speaker.say(&text, language::locale_for(&preferred)).await;
        }
    }
}
