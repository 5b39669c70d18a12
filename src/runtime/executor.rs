//! Conversation runtime executor

use crate::generation::GenerationClient;
use crate::state_machine::{
    transition, ConversationState, Effect, Event, Intent, TransitionError,
};

/// Runs user turns for one session against any generation client
pub struct ConversationRuntime<G: GenerationClient> {
    session_id: String,
    state: ConversationState,
    generator: G,
}

impl<G: GenerationClient> ConversationRuntime<G> {
    pub fn new(session_id: impl Into<String>, state: ConversationState, generator: G) -> Self {
        Self {
            session_id: session_id.into(),
            state,
            generator,
        }
    }

    /// Start a cycle with an ingredient list
    pub async fn submit_ingredients(&mut self, text: &str) -> Result<(), TransitionError> {
        self.process_event(Event::user_message(text, Intent::Ingredients))
            .await
    }

    /// Answer the clarifying questions and get a recipe
    pub async fn submit_clarification_answer(&mut self, text: &str) -> Result<(), TransitionError> {
        self.process_event(Event::user_message(text, Intent::Preferences))
            .await
    }

    /// Submit text whose meaning follows the current phase
    pub async fn submit_message(&mut self, text: &str) -> Result<(), TransitionError> {
        self.process_event(Event::user_message(text, Intent::FollowPhase))
            .await
    }

    /// Return to an empty conversation; idempotent
    pub async fn clear_conversation(&mut self) -> Result<(), TransitionError> {
        self.process_event(Event::Clear).await
    }

    #[cfg(test)]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Copy of the current state for a UI collaborator
    pub fn snapshot(&self) -> ConversationState {
        self.state.clone()
    }

    /// Run one event and every event its effects produce. A rejected turn
    /// leaves the state exactly as it was.
    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let before = self.state.clone();
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            // Pure state transition
            let result = match transition(&self.state, current_event) {
                Ok(r) => r,
                Err(e) => {
                    tracing::info!(
                        session_id = %self.session_id,
                        phase = self.state.phase().name(),
                        error = %e,
                        "Turn rejected"
                    );
                    self.state = before;
                    return Err(e);
                }
            };

            let old_phase = self.state.phase().name();
            self.state.set_phase(result.new_phase);
            tracing::debug!(
                session_id = %self.session_id,
                from = old_phase,
                to = self.state.phase().name(),
                "Phase transition"
            );

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect).await {
                    events_to_process.push(next);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::GenerateQuestions {
                ingredients,
                preferences,
            } => {
                let result = self
                    .generator
                    .generate_clarifying_questions(&ingredients, &preferences)
                    .await;
                Some(Event::QuestionsGenerated { result })
            }

            Effect::GenerateRecipe { request } => {
                let result = self
                    .generator
                    .generate_recipe(&request.ingredients, &request.preferences)
                    .await;
                Some(Event::RecipeGenerated { result })
            }

            Effect::GenerateImage { dish_name } => {
                let image = match self.generator.generate_dish_image(&dish_name).await {
                    Ok(image) => image,
                    Err(e) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            dish = %dish_name,
                            error = %e,
                            "Image generation failed, continuing without image"
                        );
                        None
                    }
                };
                Some(Event::ImageGenerated { image })
            }

            Effect::RecordCompletedRecipe => {
                self.state.apply(&effect);
                tracing::info!(
                    session_id = %self.session_id,
                    completed = self.state.completed_recipe_count(),
                    "Recipe cycle completed"
                );
                None
            }

            other => {
                self.state.apply(&other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::llm::ImageData;
    use crate::runtime::testing::{GenerationCall, MockGenerator};
    use crate::state_machine::{Phase, Role};
    use crate::state_machine::transition::RECIPE_APOLOGY;
    use std::sync::Arc;

    const RECIPE: &str = "**🍳 Recipe: Dal Khichdi**\n**Time:** 20 mins | **Serves:** 2\n\
        **Step 1:** Dal chawal dho lo.\n**Nani's Tip:** Ghee zaroor daalna!";

    fn runtime(mock: &Arc<MockGenerator>) -> ConversationRuntime<Arc<MockGenerator>> {
        ConversationRuntime::new("test-session", ConversationState::new(), mock.clone())
    }

    #[tokio::test]
    async fn test_full_cycle_scenario() {
        let mock = Arc::new(MockGenerator::new());
        mock.queue_questions(Ok("Namaste beta! Kitna teekha chahiye?".to_string()));
        mock.queue_recipe(Ok(RECIPE.to_string()));
        mock.queue_image(Ok(Some(ImageData::png("aGVsbG8="))));
        let mut rt = runtime(&mock);

        rt.submit_ingredients("rice, dal, onions").await.unwrap();
        assert_eq!(rt.state().phase(), &Phase::AwaitingClarification);
        assert_eq!(rt.state().completed_recipe_count(), 0);

        rt.submit_clarification_answer("medium spicy, 20 minutes, vegetarian")
            .await
            .unwrap();
        assert_eq!(rt.state().phase(), &Phase::AwaitingIngredients);
        assert_eq!(rt.state().completed_recipe_count(), 1);

        assert_eq!(
            mock.recorded_calls(),
            vec![
                GenerationCall::Questions {
                    ingredients: "rice, dal, onions".to_string(),
                    preferences: String::new(),
                },
                GenerationCall::Recipe {
                    ingredients: "rice, dal, onions".to_string(),
                    preferences: "medium spicy, 20 minutes, vegetarian".to_string(),
                },
                GenerationCall::Image {
                    dish_name: "Dal Khichdi".to_string(),
                },
            ]
        );

        let history = rt.state().history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].role, Role::Assistant);
        assert!(history[1].image.is_none());
        assert_eq!(history[3].text, RECIPE);
        assert_eq!(history[3].image, Some(ImageData::png("aGVsbG8=")));
    }

    #[tokio::test]
    async fn test_recipe_failure_appends_apology() {
        let mock = Arc::new(MockGenerator::new());
        mock.queue_questions(Ok("Kitna teekha?".to_string()));
        mock.queue_recipe(Err(GenerationError::Backend("rate limited".to_string())));
        let mut rt = runtime(&mock);

        rt.submit_message("aloo, aata").await.unwrap();
        rt.submit_message("bina pyaaz").await.unwrap();

        assert_eq!(rt.state().phase(), &Phase::AwaitingIngredients);
        assert_eq!(rt.state().completed_recipe_count(), 1);
        let last = rt.state().history().last().unwrap();
        assert_eq!(last.text, RECIPE_APOLOGY);
        assert!(last.image.is_none());
        assert!(!mock
            .recorded_calls()
            .iter()
            .any(|c| matches!(c, GenerationCall::Image { .. })));
    }

    #[tokio::test]
    async fn test_image_failure_keeps_recipe() {
        let mock = Arc::new(MockGenerator::new());
        mock.queue_questions(Ok("Kitna teekha?".to_string()));
        mock.queue_recipe(Ok(RECIPE.to_string()));
        mock.queue_image(Err(GenerationError::Backend("content policy".to_string())));
        let mut rt = runtime(&mock);

        rt.submit_ingredients("rice, dal").await.unwrap();
        rt.submit_clarification_answer("teekha").await.unwrap();

        let last = rt.state().history().last().unwrap();
        assert_eq!(last.text, RECIPE);
        assert!(last.image.is_none());
        assert_eq!(rt.state().completed_recipe_count(), 1);
    }

    #[tokio::test]
    async fn test_second_cycle_uses_new_ingredients() {
        let mock = Arc::new(MockGenerator::new());
        for _ in 0..2 {
            mock.queue_questions(Ok("Kitna teekha?".to_string()));
            mock.queue_recipe(Ok(RECIPE.to_string()));
            mock.queue_image(Ok(None));
        }
        let mut rt = runtime(&mock);

        rt.submit_message("rice, dal").await.unwrap();
        rt.submit_message("mild").await.unwrap();
        rt.submit_message("paneer, matar").await.unwrap();
        rt.submit_message("spicy").await.unwrap();

        let recipe_calls: Vec<_> = mock
            .recorded_calls()
            .into_iter()
            .filter(|c| matches!(c, GenerationCall::Recipe { .. }))
            .collect();
        assert_eq!(
            recipe_calls[1],
            GenerationCall::Recipe {
                ingredients: "paneer, matar".to_string(),
                preferences: "spicy".to_string(),
            }
        );
        assert_eq!(rt.state().completed_recipe_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_turn_leaves_state_unchanged() {
        let mock = Arc::new(MockGenerator::new());
        let mut rt = runtime(&mock);

        let err = rt.submit_clarification_answer("spicy").await.unwrap_err();
        assert!(matches!(err, TransitionError::WrongPhase { .. }));
        let err = rt.submit_ingredients("   ").await.unwrap_err();
        assert_eq!(err, TransitionError::EmptyInput);

        assert_eq!(rt.state(), &ConversationState::new());
        assert!(mock.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_twice_yields_empty_state() {
        let mock = Arc::new(MockGenerator::new());
        mock.queue_questions(Ok("Kitna teekha?".to_string()));
        let mut rt = runtime(&mock);

        rt.submit_ingredients("rice").await.unwrap();
        rt.clear_conversation().await.unwrap();
        let once = rt.snapshot();
        rt.clear_conversation().await.unwrap();

        assert_eq!(once, rt.snapshot());
        assert_eq!(rt.snapshot(), ConversationState::default());
    }
}
