//! Dish name extraction from generated recipe text
//!
//! The recipe prompt asks for a title line shaped like
//! `**🍳 Recipe: Aloo Paratha**`. This module is the other half of that
//! contract: it finds the line and returns the inner dish name, falling back
//! to [`FALLBACK_DISH_NAME`] when the model ignored the format.

use regex::Regex;
use std::sync::LazyLock;

/// Placeholder used when no title line can be found
pub const FALLBACK_DISH_NAME: &str = "dish";

const MAX_DISH_NAME_LENGTH: usize = 80;

/// Title line: optional decoration (markdown, emoji, whitespace), the word
/// `Recipe`, a colon, then the dish name.
static TITLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^\p{L}\p{N}]*recipe\s*:\s*(?P<name>.*)$")
        .expect("title line regex is invalid")
});

/// Extract the dish name, or the fallback placeholder.
pub fn recipe_title(recipe: &str) -> String {
    find_recipe_title(recipe).unwrap_or_else(|| {
        tracing::debug!("No recipe title marker found, using fallback");
        FALLBACK_DISH_NAME.to_string()
    })
}

/// Scan line by line for the first title marker with a non-empty name.
pub fn find_recipe_title(recipe: &str) -> Option<String> {
    recipe
        .lines()
        .filter_map(|line| TITLE_LINE.captures(line.trim()))
        .filter_map(|caps| caps.name("name").map(|m| clean_name(m.as_str())))
        .find(|name| !name.is_empty())
}

/// Strip emphasis punctuation and bound the length
fn clean_name(raw: &str) -> String {
    let without_emphasis: String = raw.chars().filter(|c| !matches!(c, '*' | '`')).collect();

    let trimmed = without_emphasis.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '_' | '#' | '"' | '\'' | '“' | '”' | ':' | '-')
    });

    if trimmed.chars().count() > MAX_DISH_NAME_LENGTH {
        trimmed
            .chars()
            .take(MAX_DISH_NAME_LENGTH)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        trimmed.to_string()
    }
}
