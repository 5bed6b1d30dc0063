//! Conversation session model.
//!
//! Holds the backend conversation identity and the committed turn history.
//! The in-progress answer of a running stream is never stored here; it only
//! becomes a turn once the stream finishes.

use super::message::Turn;
use crate::error::{AssistError, Result};
use crate::reference::Reference;
use uuid::Uuid;

/// Ordered history of one conversation with the assistant.
///
/// Invariants:
/// - `conversation_id` is set at most once between resets
/// - `turns` is append-only
/// - every assistant turn answers exactly one preceding user turn
#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Client-local identifier, only used to correlate log lines.
    session_id: String,
    /// Identifier assigned by the backend on the first response.
    conversation_id: Option<String>,
    turns: Vec<Turn>,
    /// True between `append_user_turn` and the matching assistant commit.
    awaiting_reply: bool,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            conversation_id: None,
            turns: Vec::new(),
            awaiting_reply: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Committed turns in commit order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Records the backend conversation id.
    ///
    /// Returns `false` without touching the session if an id is already set.
    pub fn assign_conversation_id(&mut self, conversation_id: impl Into<String>) -> bool {
        if self.conversation_id.is_some() {
            return false;
        }
        self.conversation_id = Some(conversation_id.into());
        true
    }

    /// Appends a user query.
    ///
    /// Several user turns may follow each other when a query is superseded
    /// before it was answered.
    pub fn append_user_turn(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
        self.awaiting_reply = true;
    }

    /// Commits the assistant answer to the latest user turn.
    pub fn commit_assistant_turn(
        &mut self,
        content: impl Into<String>,
        references: Vec<Reference>,
    ) -> Result<()> {
        if !self.awaiting_reply {
            return Err(AssistError::session(
                "assistant turn committed without a pending user turn",
            ));
        }
        self.turns.push(Turn::assistant(content, references));
        self.awaiting_reply = false;
        Ok(())
    }

    /// Discards the conversation: id, turns and pending state go together.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
