//! Provider registry built from environment configuration

use super::{
    ImageService, LlmError, LlmService, LoggingService, OpenAIImageService, OpenAIService,
};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the generation backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL (e.g. `https://api.openai.com/v1`)
    pub base_url: Option<String>,
    pub chat_model: String,
    pub image_model: String,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Read provider settings through `lookup` (normally the process
    /// environment)
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("LLM_BASE_URL").filter(|u| !u.trim().is_empty()),
            chat_model: lookup("NANI_CHAT_MODEL").unwrap_or(defaults.chat_model),
            image_model: lookup("NANI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            request_timeout: lookup("NANI_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}

/// Available chat and image services
pub struct ModelRegistry {
    chat: Option<Arc<dyn LlmService>>,
    images: Option<Arc<dyn ImageService>>,
}

impl ModelRegistry {
    /// Create an empty registry (every call fails as unconfigured)
    pub fn new_empty() -> Self {
        Self {
            chat: None,
            images: None,
        }
    }

    #[cfg(test)]
    pub fn from_services(
        chat: Option<Arc<dyn LlmService>>,
        images: Option<Arc<dyn ImageService>>,
    ) -> Self {
        Self { chat, images }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let Some(api_key) = config.api_key.clone() else {
            return Self::new_empty();
        };

        let chat = match OpenAIService::new(
            api_key.clone(),
            config.chat_model.clone(),
            config.base_url.as_deref(),
            config.request_timeout,
        ) {
            Ok(service) => {
                Some(Arc::new(LoggingService::new(Arc::new(service))) as Arc<dyn LlmService>)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create chat service");
                None
            }
        };

        let images = match OpenAIImageService::new(
            api_key,
            config.image_model.clone(),
            config.base_url.as_deref(),
            config.request_timeout,
        ) {
            Ok(service) => Some(Arc::new(service) as Arc<dyn ImageService>),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create image service");
                None
            }
        };

        Self { chat, images }
    }

    /// Chat service, or an auth error when no key is configured
    pub fn chat(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        self.chat
            .clone()
            .ok_or_else(|| LlmError::auth("No chat model configured (set OPENAI_API_KEY)"))
    }

    /// Image service, if one is configured
    pub fn images(&self) -> Option<Arc<dyn ImageService>> {
        self.images.clone()
    }

    pub fn has_models(&self) -> bool {
        self.chat.is_some()
    }

    pub fn chat_model_id(&self) -> Option<&str> {
        self.chat.as_deref().map(LlmService::model_id)
    }
}
