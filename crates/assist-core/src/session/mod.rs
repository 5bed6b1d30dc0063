//! Session domain module.
//!
//! This module contains the conversation model and the typed stream events
//! that drive it.
//!
//! # Module Structure
//!
//! - `model`: Conversation history and identity (`ConversationSession`)
//! - `message`: Turn types (`TurnRole`, `Turn`)
//! - `event`: Decoded stream frames (`StreamEvent`)
//! - `state`: Search lifecycle (`LifecycleState`)
//!
//! # Usage
//!
//! ```ignore
//! use assist_core::session::{ConversationSession, Turn, TurnRole};
//! use assist_core::session::{LifecycleState, StreamEvent};
//! ```

mod event;
mod message;
mod model;
mod state;

// Re-export public API
pub use event::StreamEvent;
pub use message::{Turn, TurnRole};
pub use model::ConversationSession;
pub use state::LifecycleState;
