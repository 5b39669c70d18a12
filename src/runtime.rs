//! Runtime for executing conversations
//!
//! [`SessionManager`] owns every live session: its stored state, a turn
//! lock that serializes user input, and a per-session generation cache.
//! Each turn runs a short-lived [`ConversationRuntime`] over the stored
//! state and writes the result back.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::generation::{CachedGenerator, GenerationClient};
use crate::state_machine::{ConversationState, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Session storage failed: {0}")]
    Storage(String),
}

/// Per-session resources that outlive a single turn
struct SessionHandle<G: ?Sized> {
    turn_lock: Mutex<()>,
    generator: Arc<CachedGenerator<Arc<G>>>,
}

/// Which inbound operation a turn came from
enum Turn<'a> {
    Ingredients(&'a str),
    Answer(&'a str),
    Message(&'a str),
    Clear,
}

/// Manager for all conversation sessions
pub struct SessionManager<G: GenerationClient + ?Sized> {
    backend: Arc<G>,
    store: Arc<dyn SessionStore>,
    sessions: RwLock<HashMap<String, Arc<SessionHandle<G>>>>,
}

impl<G: GenerationClient + ?Sized> SessionManager<G> {
    pub fn new(backend: Arc<G>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session with an empty conversation
    pub async fn create(&self) -> Result<(String, ConversationState), SessionError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let state = ConversationState::new();
        self.store
            .save(&session_id, &state)
            .await
            .map_err(SessionError::Storage)?;

        let handle = SessionHandle {
            turn_lock: Mutex::new(()),
            generator: Arc::new(CachedGenerator::new(self.backend.clone())),
        };
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(handle));

        tracing::info!(session_id = %session_id, "Session created");
        Ok((session_id, state))
    }

    /// Current state of a session
    pub async fn snapshot(&self, session_id: &str) -> Result<ConversationState, SessionError> {
        self.store
            .load(session_id)
            .await
            .map_err(SessionError::Storage)?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub async fn submit_ingredients(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ConversationState, SessionError> {
        self.run_turn(session_id, Turn::Ingredients(text)).await
    }

    pub async fn submit_clarification_answer(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ConversationState, SessionError> {
        self.run_turn(session_id, Turn::Answer(text)).await
    }

    pub async fn submit_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<ConversationState, SessionError> {
        self.run_turn(session_id, Turn::Message(text)).await
    }

    /// Empty the conversation and drop the session's cached generations
    pub async fn clear_conversation(
        &self,
        session_id: &str,
    ) -> Result<ConversationState, SessionError> {
        self.run_turn(session_id, Turn::Clear).await
    }

    /// End a session and destroy its state
    pub async fn remove(&self, session_id: &str) -> Result<(), SessionError> {
        let had_handle = self.sessions.write().await.remove(session_id).is_some();
        let had_state = self
            .store
            .remove(session_id)
            .await
            .map_err(SessionError::Storage)?;
        if !had_handle && !had_state {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        let active_sessions = self.session_count().await;
        tracing::info!(session_id = %session_id, active_sessions, "Session removed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn handle(&self, session_id: &str) -> Result<Arc<SessionHandle<G>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn run_turn(
        &self,
        session_id: &str,
        turn: Turn<'_>,
    ) -> Result<ConversationState, SessionError> {
        let handle = self.handle(session_id).await?;
        // Input arriving mid-turn is rejected rather than queued
        let _turn = handle
            .turn_lock
            .try_lock()
            .map_err(|_| TransitionError::Busy)?;

        let state = self.snapshot(session_id).await?;
        let mut runtime = ConversationRuntime::new(session_id, state, handle.generator.clone());
        match turn {
            Turn::Ingredients(text) => runtime.submit_ingredients(text).await?,
            Turn::Answer(text) => runtime.submit_clarification_answer(text).await?,
            Turn::Message(text) => runtime.submit_message(text).await?,
            Turn::Clear => {
                runtime.clear_conversation().await?;
                let dropped = handle.generator.cached_entries().await;
                handle.generator.invalidate_all().await;
                tracing::debug!(session_id = %session_id, dropped, "Generation cache cleared");
            }
        }

        let state = runtime.snapshot();
        // Holding the registry across the save orders it against `remove`
        let sessions = self.sessions.read().await;
        if !sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, &handle))
        {
            tracing::info!(session_id = %session_id, "Session removed mid-turn, discarding result");
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        self.store
            .save(session_id, &state)
            .await
            .map_err(SessionError::Storage)?;
        drop(sessions);
        Ok(state)
    }
}
