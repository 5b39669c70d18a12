//! Events that can occur in a conversation

use crate::generation::GenerationError;
use crate::llm::ImageData;

/// Which inbound operation a user message arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// `submit_ingredients`: only valid at the start of a cycle
    Ingredients,
    /// `submit_clarification_answer`: only valid after questions were asked
    Preferences,
    /// Plain message; meaning follows the current phase
    FollowPhase,
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage { text: String, intent: Intent },
    Clear,

    // Generation events
    QuestionsGenerated {
        result: Result<String, GenerationError>,
    },
    RecipeGenerated {
        result: Result<String, GenerationError>,
    },
    ImageGenerated {
        image: Option<ImageData>,
    },
}

impl Event {
    pub fn user_message(text: impl Into<String>, intent: Intent) -> Self {
        Event::UserMessage {
            text: text.into(),
            intent,
        }
    }
}
