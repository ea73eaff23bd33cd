//! HTTP API server for external control (clients and UI shells)
//!
//! This module provides a REST API for driving a conversation:
//! - POST /capture/:slot/start - Begin a capture cycle on a slot
//! - POST /capture/:slot/cancel - Abandon a slot's cycle
//! - POST /capture/:slot/say - Submit typed text as an utterance
//! - POST /capture/:slot/language - Change a slot's language
//! - POST /language - Change the local participant's language
//! - GET /conversation - The conversation log so far
//! - GET /status - Channel states, current notice, session view
//! - DELETE /notice - Dismiss the current notice
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
