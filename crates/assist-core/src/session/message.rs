//! Conversation turn types.

use crate::reference::Reference;
use serde::{Deserialize, Serialize};

/// Represents who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Query typed by the user.
    User,
    /// Answer produced by the assistant.
    Assistant,
}

/// A single committed message in a conversation.
///
/// References are only populated for assistant turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The role of the message sender.
    pub role: TurnRole,
    /// The content of the message (raw markdown for assistant turns).
    pub content: String,
    /// Citations attached to the answer.
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Timestamp when the turn was committed (ISO 8601 format).
    pub timestamp: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            references: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn assistant(content: impl Into<String>, references: Vec<Reference>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            references,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == TurnRole::Assistant
    }
}
