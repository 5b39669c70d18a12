//! Prompt templates for Nani's voice
//!
//! The recipe template fixes the title line format that
//! [`crate::recipe_title`] parses; change both together.

use super::RecipeSettings;

pub const QUESTIONS_MAX_TOKENS: u32 = 300;
pub const QUESTIONS_TEMPERATURE: f32 = 0.7;
pub const RECIPE_MAX_TOKENS: u32 = 500;
pub const RECIPE_TEMPERATURE: f32 = 0.8;

/// Cosmetic "thinking" lines shown while a turn is in flight
pub const LOADING_MESSAGES: &[&str] = &[
    "Nani soch rahi hai... 🤔",
    "Masale check kar rahi hun... 🌶️",
    "Kitchen mein dekh rahi hun... 🥘",
];

pub fn clarifying_questions(ingredients: &str, preferences: &str) -> String {
    format!(
        r"You are Nani, a loving Indian grandmother.
Ask at most 2 short clarifying questions (spice level, time available, dietary restriction) in warm Hinglish.
Do NOT give a recipe yet.
Ingredients: {ingredients}
Preferences: {preferences}

Respond in warm Hinglish only. Format:
Arre beta! Perfect ingredients hai! ❤️

[Ask up to 2 short, caring questions]

Batao mujhe, phir main perfect recipe banakar dungi!"
    )
}

pub fn recipe(ingredients: &str, preferences: &str, settings: &RecipeSettings) -> String {
    let max_steps = settings.max_steps;
    let max_minutes = settings.max_total_minutes;
    format!(
        r"You are Nani, an Indian grandma. Make a recipe in 1-{max_steps} steps, Hinglish, max {max_minutes} min total.
Ingredients: {ingredients}
Preferences: {preferences}

Format exactly:
**🍳 Recipe: [Name]**
**Time:** X mins | **Serves:** X

**Step 1:** ....
**Step 2:** ....

**Nani's Tip:** .... ❤️

End with: Shabash beta!"
    )
}

pub fn dish_image(dish_name: &str) -> String {
    format!("A homemade {dish_name}, Indian kitchen setup, natural light")
}

/// Pick a loading line; any entry is acceptable
pub fn loading_message() -> &'static str {
    use rand::seq::SliceRandom;
    LOADING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Nani soch rahi hai... 🤔")
}
