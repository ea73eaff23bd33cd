pub mod capture;
pub mod config;
pub mod conversation;
pub mod error;
pub mod http;
pub mod language;
pub mod orchestrator;
pub mod playback;
pub mod session;
pub mod translation;

pub use capture::{
    CaptureBackend, CaptureChannel, CaptureEvent, ChannelSnapshot, ChannelState, TypedCapture,
};
pub use config::Config;
pub use conversation::{ConversationLog, Message};
pub use error::ErrorKind;
pub use http::{create_router, AppState};
pub use orchestrator::{
    Capabilities, Notice, NoticeBoard, Orchestrator, OrchestratorConfig, OrchestratorStatus,
    SlotConfig,
};
pub use playback::{ConsolePlayback, Speaker, TextToSpeech};
pub use session::{
    EventKind, EventTransport, LocalTransport, NatsTransport, Participant, SessionBus,
    SessionEvent, SessionRoster,
};
pub use translation::{PassthroughTranslator, Translator};
