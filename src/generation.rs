//! Generation client: the three backend operations a recipe cycle needs
//!
//! [`GenerationClient`] is the seam between the conversation runtime and the
//! text/image backend. [`KitchenGenerator`] is the production implementation
//! on top of the provider registry; [`CachedGenerator`] memoizes any client.

mod cache;
pub mod prompts;

pub use cache::CachedGenerator;

use crate::llm::{ImageData, ImageRequest, LlmError, LlmRequest, ModelRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A backend call failed or produced nothing usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation backend failed: {0}")]
    Backend(String),
    #[error("generation backend returned no usable output")]
    EmptyOutput,
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        GenerationError::Backend(e.message)
    }
}

/// Limits baked into the recipe prompt and image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSettings {
    pub max_steps: u32,
    /// Upper bound on total cooking time, in minutes
    pub max_total_minutes: u32,
    pub image_size: String,
}

impl Default for RecipeSettings {
    fn default() -> Self {
        Self {
            max_steps: 3,
            max_total_minutes: 25,
            image_size: "512x512".to_string(),
        }
    }
}

/// Backend operations used by the conversation runtime
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Greeting plus at most two clarifying questions; never a recipe
    async fn generate_clarifying_questions(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError>;

    /// Short recipe with a `Recipe:` title line, numbered steps and a tip
    async fn generate_recipe(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError>;

    /// One illustrative image; `Ok(None)` means no image is available
    async fn generate_dish_image(
        &self,
        dish_name: &str,
    ) -> Result<Option<ImageData>, GenerationError>;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    async fn generate_clarifying_questions(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        (**self)
            .generate_clarifying_questions(ingredients, preferences)
            .await
    }

    async fn generate_recipe(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        (**self).generate_recipe(ingredients, preferences).await
    }

    async fn generate_dish_image(
        &self,
        dish_name: &str,
    ) -> Result<Option<ImageData>, GenerationError> {
        (**self).generate_dish_image(dish_name).await
    }
}

/// Production generator backed by the model registry
pub struct KitchenGenerator {
    registry: Arc<ModelRegistry>,
    settings: RecipeSettings,
}

impl KitchenGenerator {
    pub fn new(registry: Arc<ModelRegistry>, settings: RecipeSettings) -> Self {
        Self { registry, settings }
    }

    async fn complete_text(&self, request: LlmRequest) -> Result<String, GenerationError> {
        let llm = self.registry.chat()?;
        let response = llm.complete(&request).await?;
        let text = response.text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl GenerationClient for KitchenGenerator {
    async fn generate_clarifying_questions(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        let request = LlmRequest::prompt(prompts::clarifying_questions(ingredients, preferences))
            .with_max_tokens(prompts::QUESTIONS_MAX_TOKENS)
            .with_temperature(prompts::QUESTIONS_TEMPERATURE);
        self.complete_text(request).await
    }

    async fn generate_recipe(
        &self,
        ingredients: &str,
        preferences: &str,
    ) -> Result<String, GenerationError> {
        let request =
            LlmRequest::prompt(prompts::recipe(ingredients, preferences, &self.settings))
                .with_max_tokens(prompts::RECIPE_MAX_TOKENS)
                .with_temperature(prompts::RECIPE_TEMPERATURE);
        self.complete_text(request).await
    }

    async fn generate_dish_image(
        &self,
        dish_name: &str,
    ) -> Result<Option<ImageData>, GenerationError> {
        let Some(images) = self.registry.images() else {
            tracing::debug!("No image service configured, skipping dish image");
            return Ok(None);
        };

        let request = ImageRequest {
            prompt: prompts::dish_image(dish_name),
            size: self.settings.image_size.clone(),
        };

        let start = std::time::Instant::now();
        let image = images.generate(&request).await?;
        tracing::info!(
            model = %images.model_id(),
            dish = %dish_name,
            duration_ms = %start.elapsed().as_millis(),
            "Dish image generated"
        );
        Ok(Some(image))
    }
}
