//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the session manager with other backends.

use crate::state_machine::ConversationState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for per-session conversation state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the stored state, `None` if the session is unknown
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, String>;

    /// Replace the stored state
    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<(), String>;

    /// Destroy the stored state; returns whether it existed
    async fn remove(&self, session_id: &str) -> Result<bool, String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, String> {
        (**self).load(session_id).await
    }

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<(), String> {
        (**self).save(session_id, state).await
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        (**self).remove(session_id).await
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Process-lifetime store; state is lost on restart
#[derive(Default)]
pub struct InMemorySessionStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, String> {
        Ok(self.states.read().await.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<(), String> {
        self.states
            .write()
            .await
            .insert(session_id.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        Ok(self.states.write().await.remove(session_id).is_some())
    }
}
