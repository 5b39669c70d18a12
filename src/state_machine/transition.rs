//! Pure state transition function
//!
//! Given the same state and event this always yields the same phase and
//! effects; generation calls and history writes happen in the runtime.

use super::state::RecipeRequest;
use super::{ConversationState, Effect, Event, Intent, Phase};
use crate::generation::GenerationError;
use crate::recipe_title::recipe_title;
use thiserror::Error;

/// Shown in place of clarifying questions when question generation fails
pub const QUESTIONS_APOLOGY: &str = "Arre beta, maaf karna! 🙏 Nani ke sawaal abhi atak gaye. \
Bas itna batao: kitna teekha chahiye, kitna time hai, aur koi diet restriction?";

/// Shown in place of the recipe when recipe generation fails
pub const RECIPE_APOLOGY: &str = "Maaf karna beta, Nani se abhi recipe nahi ban payi. 🙏 \
Thodi der baad apne ingredients phir se bhejo, main zaroor kuch banaungi! ❤️";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_phase: Phase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(phase: Phase) -> Self {
        Self {
            new_phase: phase,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Nani is still cooking up a reply, wait for it to finish")]
    Busy,
    #[error("Expected phase {expected}, conversation is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Message is empty")]
    EmptyInput,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase(), event) {
        // ============================================================
        // Clearing: valid from any phase
        // ============================================================
        (_, Event::Clear) => Ok(TransitionResult::new(Phase::AwaitingIngredients)
            .with_effect(Effect::ResetConversation)),

        // ============================================================
        // User messages
        // ============================================================
        (phase, Event::UserMessage { .. }) if phase.is_working() => Err(TransitionError::Busy),

        (_, Event::UserMessage { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyInput)
        }

        // AwaitingIngredients + ingredients -> GeneratingQuestions
        (Phase::AwaitingIngredients, Event::UserMessage { text, intent })
            if intent != Intent::Preferences =>
        {
            let ingredients = text.trim().to_string();
            Ok(TransitionResult::new(Phase::GeneratingQuestions)
                .with_effect(Effect::user_turn(ingredients.clone()))
                .with_effect(Effect::GenerateQuestions {
                    ingredients,
                    preferences: String::new(),
                }))
        }

        // AwaitingClarification + preferences -> GeneratingRecipe
        (Phase::AwaitingClarification, Event::UserMessage { text, intent })
            if intent != Intent::Ingredients =>
        {
            let preferences = text.trim().to_string();
            let request = RecipeRequest {
                ingredients: state.cycle_ingredients().to_string(),
                preferences: preferences.clone(),
            };
            Ok(TransitionResult::new(Phase::GeneratingRecipe)
                .with_effect(Effect::user_turn(preferences))
                .with_effect(Effect::GenerateRecipe { request }))
        }

        (phase, Event::UserMessage { intent, .. }) => Err(TransitionError::WrongPhase {
            expected: match intent {
                Intent::Preferences => Phase::AwaitingClarification.name(),
                Intent::Ingredients | Intent::FollowPhase => Phase::AwaitingIngredients.name(),
            },
            actual: phase.name(),
        }),

        // ============================================================
        // Generation results
        // ============================================================

        // GeneratingQuestions -> AwaitingClarification, apology on failure
        (Phase::GeneratingQuestions, Event::QuestionsGenerated { result }) => {
            let text = usable_text(result).unwrap_or_else(|| QUESTIONS_APOLOGY.to_string());
            Ok(TransitionResult::new(Phase::AwaitingClarification)
                .with_effect(Effect::assistant_turn(text, None)))
        }

        // GeneratingRecipe + recipe -> GeneratingImage
        (Phase::GeneratingRecipe, Event::RecipeGenerated { result }) => match usable_text(result)
        {
            Some(recipe) => {
                let dish_name = recipe_title(&recipe);
                Ok(TransitionResult::new(Phase::GeneratingImage { recipe })
                    .with_effect(Effect::GenerateImage { dish_name }))
            }
            // No text means no title: skip the image and close the cycle
            None => Ok(complete_cycle(RECIPE_APOLOGY.to_string(), None)),
        },

        // GeneratingImage + image (or none) -> AwaitingIngredients
        (Phase::GeneratingImage { recipe }, Event::ImageGenerated { image }) => {
            Ok(complete_cycle(recipe.clone(), image))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {:?}",
            phase.name(),
            event
        ))),
    }
}

/// Append the cycle's final assistant turn, count it, start a new cycle
fn complete_cycle(text: String, image: Option<crate::llm::ImageData>) -> TransitionResult {
    TransitionResult::new(Phase::AwaitingIngredients)
        .with_effect(Effect::assistant_turn(text, image))
        .with_effect(Effect::RecordCompletedRecipe)
        .with_effect(Effect::BeginCycle)
}

/// Failed or blank generations are treated as producing no text
fn usable_text(result: Result<String, GenerationError>) -> Option<String> {
    match result {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            tracing::warn!("Generation returned blank text");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Generation failed");
            None
        }
    }
}
