//! HTTP request handlers

use super::types::{
    ErrorResponse, MessageRequest, SessionResponse, SuccessResponse, ThinkingResponse,
};
use super::AppState;
use crate::generation::prompts::loading_message;
use crate::runtime::SessionError;
use crate::state_machine::{ConversationState, TransitionError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(delete_session),
        )
        // User turns
        .route("/api/sessions/:id/ingredients", post(submit_ingredients))
        .route("/api/sessions/:id/answer", post(submit_answer))
        .route("/api/sessions/:id/messages", post(submit_message))
        .route("/api/sessions/:id/clear", post(clear_conversation))
        // Cosmetic loading indicator
        .route("/api/thinking", get(thinking))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let (id, conversation) = state.sessions.create().await?;
    Ok(Json(SessionResponse {
        id,
        state: conversation,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Turns
// ============================================================

async fn submit_ingredients(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(
        state.sessions.submit_ingredients(&id, &req.text).await?,
    ))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(
        state
            .sessions
            .submit_clarification_answer(&id, &req.text)
            .await?,
    ))
}

async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(state.sessions.submit_message(&id, &req.text).await?))
}

async fn clear_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(state.sessions.clear_conversation(&id).await?))
}

// ============================================================
// Misc
// ============================================================

async fn thinking() -> Json<ThinkingResponse> {
    Json(ThinkingResponse {
        message: loading_message(),
    })
}

async fn get_version() -> &'static str {
    concat!("nani-kitchen ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let message = e.to_string();
        match e {
            SessionError::NotFound(_) => AppError::NotFound(message),
            SessionError::Transition(TransitionError::Busy) => AppError::Conflict(message),
            SessionError::Transition(
                TransitionError::EmptyInput | TransitionError::WrongPhase { .. },
            ) => AppError::BadRequest(message),
            SessionError::Transition(TransitionError::InvalidTransition(_))
            | SessionError::Storage(_) => {
                tracing::error!(error = %message, "Session operation failed");
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
