//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` maps a state and an event to a new phase plus effects, and
//! the runtime executes those effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{Event, Intent};
pub use state::{ConversationState, Phase};
pub use transition::{transition, TransitionError};

#[cfg(test)]
pub use state::{RecipeRequest, Role};
#[cfg(test)]
pub use transition::TransitionResult;
