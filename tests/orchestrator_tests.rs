// End-to-end tests for the orchestration layer, driven through scripted
// capability fakes.

mod common;

use common::{RecordingSynthesis, ScriptedCapture, StubTranslator};
use std::sync::Arc;
use std::time::Duration;
use talkbridge::capture::{CaptureBackend, CaptureEvent, ChannelState};
use talkbridge::conversation::Message;
use talkbridge::error::ErrorKind;
use talkbridge::orchestrator::{Capabilities, Orchestrator, OrchestratorConfig, SlotConfig};
use talkbridge::session::{
    EventKind, EventTransport, LocalTransport, Participant, SessionBus, SessionEvent,
};

struct Fixture {
    orchestrator: Arc<Orchestrator>,
    capture: Arc<ScriptedCapture>,
    translator: Arc<StubTranslator>,
    synthesis: Arc<RecordingSynthesis>,
}

fn slot(id: &str, language: &str) -> SlotConfig {
    SlotConfig {
        id: id.to_string(),
        language: language.to_string(),
    }
}

fn build_fixture(slots: Vec<SlotConfig>, local: Participant, translator: StubTranslator) -> Fixture {
    let capture = Arc::new(ScriptedCapture::new());
    let translator = Arc::new(translator);
    let synthesis = Arc::new(RecordingSynthesis::instant());

    let capabilities = Capabilities {
        capture: capture.clone(),
        translator: translator.clone(),
        synthesis: synthesis.clone(),
    };
    let config = OrchestratorConfig {
        slots,
        error_display: Duration::from_millis(50),
        translate_timeout: Duration::from_millis(500),
    };

    Fixture {
        orchestrator: Orchestrator::new(capabilities, config, local),
        capture,
        translator,
        synthesis,
    }
}

fn two_slot_fixture(translator: StubTranslator) -> Fixture {
    let local = Participant {
        id: "local".to_string(),
        display_name: "Local".to_string(),
        preferred_language: "es".to_string(),
    };
    build_fixture(vec![slot("A", "es"), slot("B", "en")], local, translator)
}

fn session_fixture(id: &str, language: &str, translator: StubTranslator) -> Fixture {
    let local = Participant {
        id: id.to_string(),
        display_name: id.to_string(),
        preferred_language: language.to_string(),
    };
    build_fixture(vec![slot("self", language)], local, translator)
}

async fn wait_for_state(orchestrator: &Arc<Orchestrator>, slot: &str, state: ChannelState) {
    for _ in 0..200 {
        if orchestrator.channel_state(slot).await == Some(state) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "slot {} did not reach {:?} (currently {:?})",
        slot,
        state,
        orchestrator.channel_state(slot).await
    );
}

async fn wait_for_messages(orchestrator: &Arc<Orchestrator>, count: usize) {
    for _ in 0..200 {
        if orchestrator.log().len().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "log did not reach {} messages (has {})",
        count,
        orchestrator.log().len().await
    );
}

async fn wait_for_notice(orchestrator: &Arc<Orchestrator>, kind: ErrorKind) {
    for _ in 0..200 {
        if orchestrator
            .notices()
            .current()
            .await
            .is_some_and(|n| n.kind == kind)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("notice for {:?} never appeared", kind);
}

async fn wait_for_participants(orchestrator: &Arc<Orchestrator>, count: usize) {
    for _ in 0..200 {
        let status = orchestrator.status().await;
        if status
            .session
            .as_ref()
            .is_some_and(|s| s.participants.len() == count)
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session view did not reach {} participants", count);
}

// ----------------------------------------------------------------------------
// Co-located (two-slot) conversations
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_capture_translate_speak_cycle() {
    let fx = two_slot_fixture(StubTranslator::new().with_phrase("Hola", "en", "Hello"));

    fx.orchestrator.start_capture("A").await.unwrap();
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Listening)
    );

    fx.capture.emit(CaptureEvent::Partial("Ho".to_string())).await;
    fx.capture.emit(CaptureEvent::Final("Hola".to_string())).await;

    wait_for_messages(&fx.orchestrator, 1).await;
    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;

    let messages = fx.orchestrator.log().snapshot().await;
    assert_eq!(messages[0].text, "Hola");
    assert_eq!(messages[0].translation.as_deref(), Some("Hello"));
    assert_eq!(messages[0].sender_id, "A");
    assert_eq!(messages[0].language_code, "es");

    // The translation is spoken in the listener's locale.
    common::wait_until(|| fx.synthesis.started() == vec!["Hello".to_string()]).await;
    assert_eq!(fx.synthesis.locales(), vec!["en-US".to_string()]);
}

#[tokio::test]
async fn test_starting_second_slot_cancels_first() {
    let fx = two_slot_fixture(StubTranslator::new());

    fx.orchestrator.start_capture("A").await.unwrap();
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Listening)
    );

    fx.orchestrator.start_capture("B").await.unwrap();

    // B took the microphone; A was silenced with no error surfaced.
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Idle)
    );
    assert_eq!(
        fx.orchestrator.channel_state("B").await,
        Some(ChannelState::Listening)
    );
    assert!(fx.orchestrator.notices().current().await.is_none());

    // The open cycle now belongs to B.
    fx.capture
        .emit(CaptureEvent::Final("Good morning".to_string()))
        .await;
    wait_for_messages(&fx.orchestrator, 1).await;

    let messages = fx.orchestrator.log().snapshot().await;
    assert_eq!(messages[0].sender_id, "B");
    assert_eq!(messages[0].language_code, "en");
}

#[tokio::test]
async fn test_translation_failure_surfaces_and_recovers() {
    let fx = two_slot_fixture(StubTranslator::new());
    fx.translator.fail_with(ErrorKind::QuotaExceeded);

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.capture.emit(CaptureEvent::Final("Hola".to_string())).await;

    wait_for_state(
        &fx.orchestrator,
        "A",
        ChannelState::Error(ErrorKind::QuotaExceeded),
    )
    .await;

    // No message, no playback, and the other slot is untouched.
    assert!(fx.orchestrator.log().is_empty().await);
    assert!(fx.synthesis.started().is_empty());
    assert_eq!(
        fx.orchestrator.channel_state("B").await,
        Some(ChannelState::Idle)
    );

    wait_for_notice(&fx.orchestrator, ErrorKind::QuotaExceeded).await;
    let notice = fx.orchestrator.notices().current().await.unwrap();
    assert_eq!(notice.kind, ErrorKind::QuotaExceeded);
    assert!(!notice.persistent);

    // After the display window the channel resets itself and a new cycle
    // can start without further ceremony.
    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;
    fx.translator.fail_with(ErrorKind::QuotaExceeded);
    fx.orchestrator.start_capture("A").await.unwrap();
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Listening)
    );
}

#[tokio::test]
async fn test_runtime_capture_error_resets_channel() {
    let fx = two_slot_fixture(StubTranslator::new());

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.capture
        .emit(CaptureEvent::Failed(ErrorKind::NoSpeechDetected))
        .await;

    wait_for_state(
        &fx.orchestrator,
        "A",
        ChannelState::Error(ErrorKind::NoSpeechDetected),
    )
    .await;
    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;
    assert!(fx.orchestrator.log().is_empty().await);
}

#[tokio::test]
async fn test_capture_refusal_parks_channel() {
    let fx = two_slot_fixture(StubTranslator::new());
    fx.capture.refuse_next(ErrorKind::CapturePermissionDenied);

    fx.orchestrator.start_capture("A").await.unwrap();

    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Error(ErrorKind::CapturePermissionDenied))
    );
    let notice = fx.orchestrator.notices().current().await.unwrap();
    assert_eq!(notice.kind, ErrorKind::CapturePermissionDenied);

    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;
}

#[tokio::test]
async fn test_missing_capability_notice_is_persistent() {
    let fx = two_slot_fixture(StubTranslator::new());
    fx.capture.refuse_next(ErrorKind::CaptureUnsupported);

    fx.orchestrator.start_capture("A").await.unwrap();
    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;

    // The channel reset, but the notice stays until dismissed.
    let notice = fx.orchestrator.notices().current().await.unwrap();
    assert!(notice.persistent);
    assert_eq!(notice.kind, ErrorKind::CaptureUnsupported);
}

#[tokio::test]
async fn test_empty_transcript_abandons_cycle() {
    let fx = two_slot_fixture(StubTranslator::new());

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.capture.emit(CaptureEvent::Final("   ".to_string())).await;

    wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;
    assert!(fx.orchestrator.log().is_empty().await);
    // The provider is never contacted for blank input.
    assert_eq!(fx.translator.call_count(), 0);
}

#[tokio::test]
async fn test_start_on_listening_slot_toggles_off() {
    let fx = two_slot_fixture(StubTranslator::new());

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.orchestrator.start_capture("A").await.unwrap();

    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Idle)
    );
    assert!(!fx.capture.is_listening());
    assert!(fx.orchestrator.notices().current().await.is_none());
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_discards_results() {
    let fx = two_slot_fixture(StubTranslator::new());

    // Cancelling an idle slot is a no-op.
    fx.orchestrator.cancel_capture("A").await.unwrap();
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Idle)
    );

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.orchestrator.cancel_capture("A").await.unwrap();
    assert_eq!(
        fx.orchestrator.channel_state("A").await,
        Some(ChannelState::Idle)
    );

    // The discarded cycle is gone; nothing arrives late.
    assert!(!fx.capture.emit(CaptureEvent::Final("tarde".to_string())).await);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(fx.orchestrator.log().is_empty().await);
}

#[tokio::test]
async fn test_unknown_slot_is_an_error() {
    let fx = two_slot_fixture(StubTranslator::new());
    assert!(fx.orchestrator.start_capture("Z").await.is_err());
    assert!(fx.orchestrator.cancel_capture("Z").await.is_err());
}

#[tokio::test]
async fn test_log_grows_by_one_per_completed_cycle() {
    let fx = two_slot_fixture(StubTranslator::new());

    for i in 0..3 {
        fx.orchestrator.start_capture("A").await.unwrap();
        fx.capture
            .emit(CaptureEvent::Final(format!("frase {}", i)))
            .await;
        wait_for_messages(&fx.orchestrator, i + 1).await;
        wait_for_state(&fx.orchestrator, "A", ChannelState::Idle).await;
    }

    let before: Vec<Message> = fx.orchestrator.log().snapshot().await;
    assert_eq!(before.len(), 3);

    // Another cycle appends; it never rewrites existing entries.
    fx.orchestrator.start_capture("B").await.unwrap();
    fx.capture.emit(CaptureEvent::Final("hello".to_string())).await;
    wait_for_messages(&fx.orchestrator, 4).await;

    let after = fx.orchestrator.log().snapshot().await;
    assert_eq!(&after[..3], &before[..]);
}

#[tokio::test]
async fn test_slot_language_change_applies_next_cycle() {
    let fx = two_slot_fixture(StubTranslator::new());

    fx.orchestrator.set_slot_language("A", "fr").await.unwrap();
    assert!(fx.orchestrator.set_slot_language("A", "xx").await.is_err());

    fx.orchestrator.start_capture("A").await.unwrap();
    fx.capture
        .emit(CaptureEvent::Final("Bonjour".to_string()))
        .await;
    wait_for_messages(&fx.orchestrator, 1).await;

    let messages = fx.orchestrator.log().snapshot().await;
    assert_eq!(messages[0].language_code, "fr");
}

// ----------------------------------------------------------------------------
// Shared sessions
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_session_message_reaches_peer_translated() {
    let transport = Arc::new(LocalTransport::new());

    let alice = session_fixture("alice", "es", StubTranslator::new().with_phrase("Hola", "en", "Hello"));
    let bob = session_fixture("bob", "en", StubTranslator::new());

    let bus_a = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();
    let bus_b = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();

    alice
        .orchestrator
        .join_session(bus_a, "room-1")
        .await
        .unwrap();
    bob.orchestrator.join_session(bus_b, "room-1").await.unwrap();

    // Alice observes Bob's JOIN, so she knows whom to translate for.
    wait_for_participants(&alice.orchestrator, 2).await;

    alice.orchestrator.start_capture("self").await.unwrap();
    alice
        .capture
        .emit(CaptureEvent::Final("Hola".to_string()))
        .await;

    wait_for_messages(&alice.orchestrator, 1).await;
    wait_for_messages(&bob.orchestrator, 1).await;

    // Bob received Alice's message with the sender-side translation and
    // never had to call his own provider.
    let received = bob.orchestrator.log().snapshot().await;
    assert_eq!(received[0].text, "Hola");
    assert_eq!(received[0].translation.as_deref(), Some("Hello"));
    assert_eq!(received[0].sender_id, "alice");
    assert_eq!(bob.translator.call_count(), 0);
    common::wait_until(|| bob.synthesis.started() == vec!["Hello".to_string()]).await;

    // A publisher never receives its own event back: Alice's log still
    // holds exactly her one message.
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(alice.orchestrator.log().len().await, 1);
}

#[tokio::test]
async fn test_inbound_message_translated_when_sender_did_not() {
    let transport = Arc::new(LocalTransport::new());

    let bob = session_fixture(
        "bob",
        "en",
        StubTranslator::new().with_phrase("Bonjour", "en", "Hello there"),
    );
    let bus = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();
    bob.orchestrator.join_session(bus, "room-1").await.unwrap();

    // A peer Bob has never seen publishes an untranslated message.
    let publisher: Arc<dyn EventTransport> = transport.clone();
    let message = Message::new("Bonjour", None, "charlie", "fr");
    let event = SessionEvent::new("room-1", "charlie", EventKind::Message { message });
    publisher.send(&event).await.unwrap();

    wait_for_messages(&bob.orchestrator, 1).await;

    let received = bob.orchestrator.log().snapshot().await;
    assert_eq!(received[0].text, "Bonjour");
    assert_eq!(received[0].translation.as_deref(), Some("Hello there"));
    common::wait_until(|| bob.synthesis.started() == vec!["Hello there".to_string()]).await;
    assert_eq!(bob.synthesis.locales(), vec!["en-US".to_string()]);
}

#[tokio::test]
async fn test_events_for_other_sessions_are_ignored() {
    let transport = Arc::new(LocalTransport::new());

    let bob = session_fixture("bob", "en", StubTranslator::new());
    let bus = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();
    bob.orchestrator.join_session(bus, "room-1").await.unwrap();

    let publisher: Arc<dyn EventTransport> = transport.clone();
    let message = Message::new("wrong room", None, "charlie", "fr");
    let event = SessionEvent::new("room-2", "charlie", EventKind::Message { message });
    publisher.send(&event).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(bob.orchestrator.log().is_empty().await);
}

#[tokio::test]
async fn test_language_update_propagates_to_peers() {
    let transport = Arc::new(LocalTransport::new());

    let alice = session_fixture("alice", "es", StubTranslator::new());
    let bob = session_fixture("bob", "en", StubTranslator::new());

    let bus_a = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();
    let bus_b = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();

    alice
        .orchestrator
        .join_session(bus_a, "room-1")
        .await
        .unwrap();
    bob.orchestrator.join_session(bus_b, "room-1").await.unwrap();
    wait_for_participants(&alice.orchestrator, 2).await;

    bob.orchestrator.update_language("fr").await.unwrap();

    for _ in 0..200 {
        let status = alice.orchestrator.status().await;
        let bob_lang = status
            .session
            .as_ref()
            .and_then(|s| s.participants.iter().find(|p| p.id == "bob"))
            .map(|p| p.preferred_language.clone());
        if bob_lang.as_deref() == Some("fr") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Alice never observed Bob's language change");
}

#[tokio::test]
async fn test_leave_stops_inbound_delivery() {
    let transport = Arc::new(LocalTransport::new());

    let bob = session_fixture("bob", "en", StubTranslator::new());
    let bus = SessionBus::start(transport.clone() as Arc<dyn EventTransport>)
        .await
        .unwrap();
    bob.orchestrator.join_session(bus, "room-1").await.unwrap();
    bob.orchestrator.leave_session().await.unwrap();

    let publisher: Arc<dyn EventTransport> = transport.clone();
    let message = Message::new("anyone home?", None, "charlie", "fr");
    let event = SessionEvent::new("room-1", "charlie", EventKind::Message { message });
    publisher.send(&event).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(bob.orchestrator.log().is_empty().await);
    assert!(bob.orchestrator.status().await.session.is_none());
}
