use crate::capture::TypedCapture;
use crate::orchestrator::Orchestrator;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    /// Text-entry backend fed by the `say` endpoint
    pub typed: Arc<TypedCapture>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, typed: Arc<TypedCapture>) -> Self {
        Self { orchestrator, typed }
    }
}
