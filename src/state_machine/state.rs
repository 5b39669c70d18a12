//! Conversation state types

use super::Effect;
use crate::llm::ImageData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message in the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>, image: Option<ImageData>) -> Self {
        Self {
            role,
            text: text.into(),
            image,
            created_at: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, None)
    }

    #[cfg(test)]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, None)
    }
}

/// Position in the ingredients → clarification → recipe cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the user's ingredient list (start of every cycle)
    #[default]
    AwaitingIngredients,

    /// Ingredients received, clarifying questions being generated
    GeneratingQuestions,

    /// Questions asked, waiting for the user's preferences
    AwaitingClarification,

    /// Preferences received, recipe being generated
    GeneratingRecipe,

    /// Recipe text ready, dish image being generated
    GeneratingImage { recipe: String },
}

impl Phase {
    /// A generation call is in flight; user input is not accepted
    pub fn is_working(&self) -> bool {
        !matches!(
            self,
            Phase::AwaitingIngredients | Phase::AwaitingClarification
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingIngredients => "awaiting_ingredients",
            Phase::GeneratingQuestions => "generating_questions",
            Phase::AwaitingClarification => "awaiting_clarification",
            Phase::GeneratingRecipe => "generating_recipe",
            Phase::GeneratingImage { .. } => "generating_image",
        }
    }
}

/// Inputs for one recipe generation, derived from history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRequest {
    pub ingredients: String,
    pub preferences: String,
}

/// Everything one session knows about its conversation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    history: Vec<ConversationTurn>,
    phase: Phase,
    completed_recipe_count: u32,
    /// History index where the current cycle began
    #[serde(default)]
    cycle_start: usize,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn completed_recipe_count(&self) -> u32 {
        self.completed_recipe_count
    }

    #[cfg(test)]
    pub fn cycle_start(&self) -> usize {
        self.cycle_start
    }

    /// First user turn of the current cycle, or `""` if there is none
    pub fn cycle_ingredients(&self) -> &str {
        self.history
            .iter()
            .skip(self.cycle_start)
            .find(|turn| turn.role == Role::User)
            .map_or("", |turn| turn.text.as_str())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    // Mutators are crate-private: only the runtime applies effects.

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn append(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
    }

    pub(crate) fn record_completed_recipe(&mut self) {
        self.completed_recipe_count = self.completed_recipe_count.saturating_add(1);
    }

    pub(crate) fn begin_cycle(&mut self) {
        self.cycle_start = self.history.len();
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a history or counter effect. Generation effects need I/O and
    /// are left to the caller.
    pub(crate) fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::AppendTurn { role, text, image } => {
                self.append(ConversationTurn::new(*role, text.clone(), image.clone()));
            }
            Effect::BeginCycle => self.begin_cycle(),
            Effect::RecordCompletedRecipe => self.record_completed_recipe(),
            Effect::ResetConversation => self.reset(),
            Effect::GenerateQuestions { .. }
            | Effect::GenerateRecipe { .. }
            | Effect::GenerateImage { .. } => {}
        }
    }
}
