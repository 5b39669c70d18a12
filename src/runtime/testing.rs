//! Mock implementations for testing
//!
//! These mocks enable runtime and API testing without real I/O.

use crate::generation::{GenerationClient, GenerationError};
use crate::llm::ImageData;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Generator
// ============================================================================

/// One call made against a [`MockGenerator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationCall {
    Questions {
        ingredients: String,
        preferences: String,
    },
    Recipe {
        ingredients: String,
        preferences: String,
    },
    Image {
        dish_name: String,
    },
}

/// Pauses every call until released, so a turn can be held in flight
struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// Mock generation client that returns queued responses per operation
#[derive(Default)]
pub struct MockGenerator {
    questions: Mutex<VecDeque<Result<String, GenerationError>>>,
    recipes: Mutex<VecDeque<Result<String, GenerationError>>>,
    images: Mutex<VecDeque<Result<Option<ImageData>, GenerationError>>>,
    /// Record of all calls made
    calls: Mutex<Vec<GenerationCall>>,
    gate: Option<Gate>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block every call until `release` is notified; `entered` fires once a
    /// call is waiting.
    pub fn gated(entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            gate: Some(Gate { entered, release }),
            ..Self::default()
        }
    }

    pub fn queue_questions(&self, response: Result<String, GenerationError>) {
        self.questions.lock().unwrap().push_back(response);
    }

    pub fn queue_recipe(&self, response: Result<String, GenerationError>) {
        self.recipes.lock().unwrap().push_back(response);
    }

    pub fn queue_image(&self, response: Result<Option<ImageData>, GenerationError>) {
        self.images.lock().unwrap().push_back(response);
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: GenerationCall) {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

fn nothing_queued<T>() -> Result<T, GenerationError> {
    Err(GenerationError::Backend("No mock response queued".to_string()))
}

#[async_trait]
impl GenerationClient for MockGenerator {
    async fn generate_clarifying_questions(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        self.record(GenerationCall::Questions {
            ingredients: ingredients.to_string(),
            preferences: preferences.to_string(),
        })
        .await;
        self.questions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(nothing_queued)
    }

    async fn generate_recipe(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        self.record(GenerationCall::Recipe {
            ingredients: ingredients.to_string(),
            preferences: preferences.to_string(),
        })
        .await;
        self.recipes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(nothing_queued)
    }

    async fn generate_dish_image(
        &self,
        dish_name: &str,
    ) -> Result<Option<ImageData>, GenerationError> {
        self.record(GenerationCall::Image {
            dish_name: dish_name.to_string(),
        })
        .await;
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(nothing_queued)
    }
}
