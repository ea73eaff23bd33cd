//! Conversation orchestration.
//!
//! The `Orchestrator` coordinates capture channels, the translation and
//! synthesis capabilities, and (in session mode) the session bus. It
//! owns the mutual-exclusion rule between capture slots, the
//! capture→translate→speak cycle, the error policy, and the inbound path
//! for messages arriving from remote participants.

mod config;
mod notice;
#[allow(clippy::module_inception)]
mod orchestrator;

pub use config::{OrchestratorConfig, SlotConfig};
pub use notice::{Notice, NoticeBoard};
pub use orchestrator::{Capabilities, Orchestrator, OrchestratorStatus, SessionStatus};
