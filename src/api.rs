//! HTTP API for Nani's Kitchen
//!
//! JSON endpoints over the session manager; every turn endpoint answers with
//! the updated conversation state.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::generation::GenerationClient;
use crate::runtime::{InMemorySessionStore, SessionManager};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager<dyn GenerationClient>>,
}

impl AppState {
    pub fn new(generator: Arc<dyn GenerationClient>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(
                generator,
                Arc::new(InMemorySessionStore::new()),
            )),
        }
    }
}
