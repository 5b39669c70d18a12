//! API request and response types

use crate::state_machine::ConversationState;
use serde::{Deserialize, Serialize};

/// Request carrying one user message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Response with a session id and its state
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub state: ConversationState,
}

/// Random cosmetic loading line
#[derive(Debug, Serialize)]
pub struct ThinkingResponse {
    pub message: &'static str,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
