//! Speech capture.
//!
//! This module provides:
//! - The `CaptureBackend` capability boundary a platform recognizer
//!   implements
//! - The `CaptureChannel` state machine driving one speaker slot's
//!   listen → transcript lifecycle
//! - `TypedCapture`, a text-entry backend where typed input takes the
//!   same path as spoken input

mod backend;
mod channel;
mod typed;

pub use backend::{CaptureBackend, CaptureEvent};
pub use channel::{CaptureChannel, ChannelSnapshot, ChannelState, TransitionError};
pub use typed::TypedCapture;
