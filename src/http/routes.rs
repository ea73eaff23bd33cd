use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Capture control
        .route("/capture/:slot/start", post(handlers::start_capture))
        .route("/capture/:slot/cancel", post(handlers::cancel_capture))
        .route("/capture/:slot/say", post(handlers::say))
        .route("/capture/:slot/language", post(handlers::set_slot_language))
        // Participant
        .route("/language", post(handlers::update_language))
        // Conversation queries
        .route("/conversation", get(handlers::get_conversation))
        .route("/status", get(handlers::get_status))
        .route("/notice", delete(handlers::dismiss_notice))
        // Middleware: request logging + permissive CORS for UI shells
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
