#![allow(dead_code)]

// Shared capability fakes for the integration tests.
//
// `ScriptedCapture` lets a test drive a capture cycle event by event;
// `StubTranslator` answers from a phrase table or fails on demand;
// `RecordingSynthesis` records which utterances started and which
// actually completed, optionally holding each one open until released.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use talkbridge::capture::{CaptureBackend, CaptureEvent};
use talkbridge::error::ErrorKind;
use talkbridge::playback::TextToSpeech;
use talkbridge::translation::Translator;
use tokio::sync::{mpsc, Mutex, Notify};

pub struct ScriptedCapture {
    cycle_tx: Mutex<Option<mpsc::Sender<CaptureEvent>>>,
    refuse_next: StdMutex<Option<ErrorKind>>,
    listening: AtomicBool,
}

impl ScriptedCapture {
    pub fn new() -> Self {
        Self {
            cycle_tx: Mutex::new(None),
            refuse_next: StdMutex::new(None),
            listening: AtomicBool::new(false),
        }
    }

    /// Make the next `start` fail with the given kind.
    pub fn refuse_next(&self, kind: ErrorKind) {
        *self.refuse_next.lock().unwrap() = Some(kind);
    }

    /// Emit an event into the open cycle. Returns false when no cycle is
    /// open or the receiver is gone.
    pub async fn emit(&self, event: CaptureEvent) -> bool {
        let ended = matches!(event, CaptureEvent::Final(_) | CaptureEvent::Failed(_));
        let guard = self.cycle_tx.lock().await;
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        let sent = tx.send(event).await.is_ok();
        if sent && ended {
            self.listening.store(false, Ordering::SeqCst);
        }
        sent
    }
}

#[async_trait]
impl CaptureBackend for ScriptedCapture {
    async fn start(&self, _locale: &str) -> Result<mpsc::Receiver<CaptureEvent>, ErrorKind> {
        if let Some(kind) = self.refuse_next.lock().unwrap().take() {
            return Err(kind);
        }
        let (tx, rx) = mpsc::channel(8);
        *self.cycle_tx.lock().await = Some(tx);
        self.listening.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&self) {
        self.cycle_tx.lock().await.take();
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub struct StubTranslator {
    phrases: StdMutex<HashMap<(String, String), String>>,
    fail_with: StdMutex<Option<ErrorKind>>,
    pub calls: StdMutex<Vec<(String, String, String)>>,
}

impl StubTranslator {
    pub fn new() -> Self {
        Self {
            phrases: StdMutex::new(HashMap::new()),
            fail_with: StdMutex::new(None),
            calls: StdMutex::new(Vec::new()),
        }
    }

    pub fn with_phrase(self, text: &str, target: &str, translated: &str) -> Self {
        self.phrases
            .lock()
            .unwrap()
            .insert((text.to_string(), target.to_string()), translated.to_string());
        self
    }

    pub fn fail_with(&self, kind: ErrorKind) {
        *self.fail_with.lock().unwrap() = Some(kind);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ErrorKind> {
        self.calls.lock().unwrap().push((
            text.to_string(),
            source_lang.to_string(),
            target_lang.to_string(),
        ));
        if let Some(kind) = *self.fail_with.lock().unwrap() {
            return Err(kind);
        }
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let phrases = self.phrases.lock().unwrap();
        Ok(phrases
            .get(&(text.to_string(), target_lang.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("{} ({})", text, target_lang)))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub struct RecordingSynthesis {
    pub started: StdMutex<Vec<String>>,
    pub completed: StdMutex<Vec<String>>,
    pub locales: StdMutex<Vec<String>>,
    release: Notify,
    hold: bool,
    speaking: AtomicBool,
}

impl RecordingSynthesis {
    /// Utterances complete as soon as they start.
    pub fn instant() -> Self {
        Self::with_hold(false)
    }

    /// Utterances stay in flight until `release` is called.
    pub fn held() -> Self {
        Self::with_hold(true)
    }

    fn with_hold(hold: bool) -> Self {
        Self {
            started: StdMutex::new(Vec::new()),
            completed: StdMutex::new(Vec::new()),
            locales: StdMutex::new(Vec::new()),
            release: Notify::new(),
            hold,
            speaking: AtomicBool::new(false),
        }
    }

    /// Let the next held utterance finish. The permit is stored, so
    /// releasing before the utterance reaches its wait point still works.
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn locales(&self) -> Vec<String> {
        self.locales.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextToSpeech for RecordingSynthesis {
    async fn speak(&self, text: &str, locale: &str) -> Result<(), ErrorKind> {
        self.started.lock().unwrap().push(text.to_string());
        self.locales.lock().unwrap().push(locale.to_string());
        self.speaking.store(true, Ordering::SeqCst);
        if self.hold {
            self.release.notified().await;
        }
        self.speaking.store(false, Ordering::SeqCst);
        self.completed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn stop(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Poll until `check` passes or the deadline expires.
pub async fn wait_until<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached within deadline");
}
