//! Conversation lifecycle of the portal assistant.
//!
//! `SearchLifecycleController` owns the conversation session, opens one
//! stream per query through a `StreamOpener` and commits completed answers.

pub mod controller;

pub use controller::{ControllerSnapshot, SearchLifecycleController};
