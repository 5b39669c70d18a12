//! Process configuration from environment variables

use crate::generation::RecipeSettings;
use crate::llm::LlmConfig;

pub const DEFAULT_PORT: u16 = 8000;

/// Everything `main` needs to start the server
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub recipe: RecipeSettings,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or unparsable values fall back
    /// to defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let llm = LlmConfig::from_lookup(&lookup);
        let defaults = RecipeSettings::default();
        let recipe = RecipeSettings {
            max_steps: parse_or(&lookup, "NANI_MAX_STEPS", defaults.max_steps),
            max_total_minutes: parse_or(&lookup, "NANI_MAX_MINUTES", defaults.max_total_minutes),
            image_size: lookup("NANI_IMAGE_SIZE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.image_size),
        };

        Self {
            llm,
            recipe,
            port: parse_or(&lookup, "NANI_PORT", DEFAULT_PORT),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup(name) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Ignoring unparsable setting");
                default
            }
        },
        None => default,
    }
}
