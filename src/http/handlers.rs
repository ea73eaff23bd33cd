use super::state::AppState;
use crate::capture::ChannelState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SayRequest {
    /// Typed text treated as the slot's utterance
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    /// Short language code ("es", "en", ...)
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub slot: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /capture/:slot/start
/// Begin a capture cycle (cancels any other active slot)
pub async fn start_capture(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.start_capture(&slot).await {
        Ok(()) => (
            StatusCode::OK,
            Json(CaptureResponse {
                slot,
                status: "listening".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /capture/:slot/cancel
/// Abandon the slot's cycle, discarding in-flight results
pub async fn cancel_capture(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.cancel_capture(&slot).await {
        Ok(()) => (
            StatusCode::OK,
            Json(CaptureResponse {
                slot,
                status: "idle".to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /capture/:slot/say
/// Submit typed text as the slot's utterance. Opens a cycle when none is
/// listening, then completes it with the text as the final transcript.
pub async fn say(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    Json(req): Json<SayRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "text must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    // The text must land in this slot's cycle, not whichever cycle
    // happens to be open elsewhere.
    match state.orchestrator.channel_state(&slot).await {
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("unknown capture slot: {}", slot),
                }),
            )
                .into_response();
        }
        Some(ChannelState::Listening) => {}
        Some(ChannelState::Processing) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "a capture cycle is already processing".to_string(),
                }),
            )
                .into_response();
        }
        Some(_) => {
            if let Err(e) = state.orchestrator.start_capture(&slot).await {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    if !state.typed.submit(&req.text).await {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "no capture cycle is listening".to_string(),
            }),
        )
            .into_response();
    }

    info!("Accepted typed utterance for slot {}", slot);

    (
        StatusCode::ACCEPTED,
        Json(CaptureResponse {
            slot,
            status: "accepted".to_string(),
        }),
    )
        .into_response()
}

/// POST /capture/:slot/language
/// Change the language captured on a slot
pub async fn set_slot_language(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    Json(req): Json<LanguageRequest>,
) -> impl IntoResponse {
    match state.orchestrator.set_slot_language(&slot, &req.language).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /language
/// Change the local participant's preferred language (announced to the
/// session when joined)
pub async fn update_language(
    State(state): State<AppState>,
    Json(req): Json<LanguageRequest>,
) -> impl IntoResponse {
    match state.orchestrator.update_language(&req.language).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /conversation
/// The conversation log so far, in display order
pub async fn get_conversation(State(state): State<AppState>) -> impl IntoResponse {
    let messages = state.orchestrator.log().snapshot().await;
    (StatusCode::OK, Json(messages)).into_response()
}

/// GET /status
/// Channel states, current notice, and session membership
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.orchestrator.status().await;
    (StatusCode::OK, Json(status)).into_response()
}

/// DELETE /notice
/// Dismiss the current notice
pub async fn dismiss_notice(State(state): State<AppState>) -> impl IntoResponse {
    state.orchestrator.notices().dismiss().await;
    StatusCode::NO_CONTENT.into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
