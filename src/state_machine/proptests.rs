//! Property-based tests for the state machine
//!
//! These drive whole user turns through `transition`, answering every
//! generation effect from a generated outcome, and check the cycle
//! invariants after each turn.

use super::*;
use crate::generation::GenerationError;
use crate::llm::ImageData;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// How the backend answers the generation calls of one turn
#[derive(Debug, Clone)]
struct Outcomes {
    questions: TextResult,
    recipe: TextResult,
    image: Option<ImageData>,
}

#[derive(Debug, Clone, Default)]
struct Calls {
    recipe_requests: Vec<RecipeRequest>,
    image_dishes: Vec<String>,
}

/// Apply a transition the way the runtime does: phase first, then effects.
/// Returns the event produced by a generation effect, if any.
fn apply(
    state: &mut ConversationState,
    result: TransitionResult,
    outcomes: &Outcomes,
    calls: &mut Calls,
) -> Option<Event> {
    state.set_phase(result.new_phase);
    let mut next = None;
    for effect in result.effects {
        state.apply(&effect);
        next = match effect {
            Effect::GenerateQuestions { .. } => Some(Event::QuestionsGenerated {
                result: outcomes.questions.clone(),
            }),
            Effect::GenerateRecipe { request } => {
                calls.recipe_requests.push(request);
                Some(Event::RecipeGenerated {
                    result: outcomes.recipe.clone(),
                })
            }
            Effect::GenerateImage { dish_name } => {
                calls.image_dishes.push(dish_name);
                Some(Event::ImageGenerated {
                    image: outcomes.image.clone(),
                })
            }
            _ => next,
        };
    }
    next
}

/// Run one user turn to completion
fn run_turn(
    state: &mut ConversationState,
    event: Event,
    outcomes: &Outcomes,
    calls: &mut Calls,
) -> Result<(), TransitionError> {
    let mut pending = Some(event);
    while let Some(event) = pending.take() {
        let result = transition(state, event)?;
        pending = apply(state, result, outcomes, calls);
    }
    Ok(())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z][a-z, ]{0,30}"
}

fn arb_generation_error() -> impl Strategy<Value = GenerationError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(GenerationError::Backend),
        Just(GenerationError::EmptyOutput),
    ]
}

type TextResult = Result<String, GenerationError>;

fn arb_text_result() -> impl Strategy<Value = TextResult> {
    prop_oneof![
        3 => "[A-Za-z!? ]{1,40}".prop_map(TextResult::Ok),
        1 => Just(TextResult::Ok("   ".to_string())),
        2 => arb_generation_error().prop_map(TextResult::Err),
    ]
}

fn arb_recipe_result() -> impl Strategy<Value = TextResult> {
    prop_oneof![
        3 => "[A-Z][a-z]{2,12}".prop_map(|name| TextResult::Ok(format!(
            "**🍳 Recipe: {name}**\n**Time:** 20 mins | **Serves:** 2\n**Step 1:** Pakao."
        ))),
        1 => "[a-z ]{1,40}".prop_map(TextResult::Ok),
        2 => arb_generation_error().prop_map(TextResult::Err),
    ]
}

fn arb_outcomes() -> impl Strategy<Value = Outcomes> {
    (
        arb_text_result(),
        arb_recipe_result(),
        proptest::option::of("[a-zA-Z0-9+/]{4,20}".prop_map(ImageData::png)),
    )
        .prop_map(|(questions, recipe, image)| Outcomes {
            questions,
            recipe,
            image,
        })
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Ingredients),
        Just(Intent::Preferences),
        Just(Intent::FollowPhase),
    ]
}

/// A user action: a message through some inbound operation, or a clear
#[derive(Debug, Clone)]
enum Action {
    Message(String, Intent),
    Clear,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => (arb_text(), arb_intent()).prop_map(|(t, i)| Action::Message(t, i)),
        1 => Just(Action::Clear),
    ]
}

fn check_invariants(state: &ConversationState) -> Result<(), TestCaseError> {
    prop_assert!(!state.phase().is_working(), "turn left state in {:?}", state.phase());
    prop_assert!(state.cycle_start() <= state.history().len());

    for turn in state.history() {
        if turn.image.is_some() {
            prop_assert_eq!(turn.role, Role::Assistant);
            prop_assert!(!turn.text.trim().is_empty());
        }
    }

    if *state.phase() == Phase::AwaitingClarification {
        let n = state.history().len();
        prop_assert!(n >= 2);
        prop_assert_eq!(state.history()[n - 2].role, Role::User);
        prop_assert_eq!(state.history()[n - 1].role, Role::Assistant);
        prop_assert!(!state.history()[n - 1].text.trim().is_empty());
    }
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_full_cycle_returns_to_start_and_counts_once(
        ingredients in arb_text(),
        preferences in arb_text(),
        outcomes in arb_outcomes(),
    ) {
        let mut state = ConversationState::new();
        let mut calls = Calls::default();

        run_turn(&mut state, Event::user_message(ingredients.clone(), Intent::Ingredients), &outcomes, &mut calls).unwrap();
        prop_assert_eq!(state.phase(), &Phase::AwaitingClarification);
        prop_assert_eq!(state.completed_recipe_count(), 0);
        prop_assert_eq!(state.history().len(), 2);

        run_turn(&mut state, Event::user_message(preferences.clone(), Intent::Preferences), &outcomes, &mut calls).unwrap();
        prop_assert_eq!(state.phase(), &Phase::AwaitingIngredients);
        prop_assert_eq!(state.completed_recipe_count(), 1);
        prop_assert_eq!(state.history().len(), 4);
        prop_assert_eq!(state.cycle_start(), 4);

        prop_assert_eq!(calls.recipe_requests.len(), 1);
        prop_assert_eq!(&calls.recipe_requests[0].ingredients, ingredients.trim());
        prop_assert_eq!(&calls.recipe_requests[0].preferences, preferences.trim());

        // Image generation happens exactly when the recipe produced text
        let recipe_usable = matches!(&outcomes.recipe, Ok(t) if !t.trim().is_empty());
        prop_assert_eq!(calls.image_dishes.len(), usize::from(recipe_usable));
        let last = &state.history()[3];
        prop_assert!(!last.text.trim().is_empty());
        if !recipe_usable {
            prop_assert!(last.image.is_none());
        }
        check_invariants(&state)?;
    }

    #[test]
    fn prop_random_sessions_keep_invariants(
        actions in proptest::collection::vec(arb_action(), 1..25),
        outcomes in arb_outcomes(),
    ) {
        let mut state = ConversationState::new();
        let mut calls = Calls::default();

        for action in actions {
            let before = state.clone();
            match action {
                Action::Clear => {
                    run_turn(&mut state, Event::Clear, &outcomes, &mut calls).unwrap();
                    prop_assert_eq!(&state, &ConversationState::default());
                }
                Action::Message(text, intent) => {
                    match run_turn(&mut state, Event::user_message(text, intent), &outcomes, &mut calls) {
                        Ok(()) => {
                            prop_assert_eq!(state.history().len(), before.history().len() + 2);
                            let expected_count = if *before.phase() == Phase::AwaitingClarification {
                                before.completed_recipe_count() + 1
                            } else {
                                before.completed_recipe_count()
                            };
                            prop_assert_eq!(state.completed_recipe_count(), expected_count);
                            prop_assert_ne!(state.phase(), before.phase());
                        }
                        Err(e) => {
                            prop_assert!(matches!(e, TransitionError::WrongPhase { .. }), "unexpected {:?}", e);
                            prop_assert_eq!(&state, &before);
                        }
                    }
                }
            }
            check_invariants(&state)?;
        }
    }

    #[test]
    fn prop_recipe_uses_current_cycle_ingredients(
        cycles in proptest::collection::vec((arb_text(), arb_text()), 1..5),
        outcomes in arb_outcomes(),
    ) {
        let mut state = ConversationState::new();
        let mut calls = Calls::default();

        for (ingredients, preferences) in &cycles {
            run_turn(&mut state, Event::user_message(ingredients.clone(), Intent::FollowPhase), &outcomes, &mut calls).unwrap();
            run_turn(&mut state, Event::user_message(preferences.clone(), Intent::FollowPhase), &outcomes, &mut calls).unwrap();
        }

        let expected: Vec<String> = cycles.iter().map(|(i, _)| i.trim().to_string()).collect();
        let actual: Vec<String> = calls.recipe_requests.iter().map(|r| r.ingredients.clone()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(state.completed_recipe_count() as usize, cycles.len());
    }

    #[test]
    fn prop_clear_is_idempotent(
        actions in proptest::collection::vec(arb_action(), 0..10),
        outcomes in arb_outcomes(),
    ) {
        let mut state = ConversationState::new();
        let mut calls = Calls::default();
        for action in actions {
            if let Action::Message(text, intent) = action {
                let _ = run_turn(&mut state, Event::user_message(text, intent), &outcomes, &mut calls);
            }
        }

        run_turn(&mut state, Event::Clear, &outcomes, &mut calls).unwrap();
        let once = state.clone();
        run_turn(&mut state, Event::Clear, &outcomes, &mut calls).unwrap();
        prop_assert_eq!(&once, &state);
        prop_assert_eq!(once, ConversationState::default());
    }
}
