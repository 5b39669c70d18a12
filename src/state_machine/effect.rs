//! Effects produced by state transitions

use super::state::{RecipeRequest, Role};
use crate::llm::ImageData;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to history (timestamped by the runtime)
    AppendTurn {
        role: Role,
        text: String,
        image: Option<ImageData>,
    },

    /// Mark the current history length as the start of a new cycle
    BeginCycle,

    /// Bump the completed recipe counter
    RecordCompletedRecipe,

    /// Wipe history, counter and cycle marker
    ResetConversation,

    /// Ask the backend for clarifying questions
    GenerateQuestions {
        ingredients: String,
        preferences: String,
    },

    /// Ask the backend for the final recipe
    GenerateRecipe { request: RecipeRequest },

    /// Ask the backend for an image of the dish
    GenerateImage { dish_name: String },
}

impl Effect {
    pub fn user_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            role: Role::User,
            text: text.into(),
            image: None,
        }
    }

    pub fn assistant_turn(text: impl Into<String>, image: Option<ImageData>) -> Self {
        Effect::AppendTurn {
            role: Role::Assistant,
            text: text.into(),
            image,
        }
    }
}
