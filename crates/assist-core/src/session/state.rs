//! Search lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the active search currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// No query submitted since the conversation started.
    #[default]
    Idle,
    /// Request sent, no frame received yet.
    Loading,
    /// Frames are arriving.
    Streaming,
    /// Last answer committed.
    Done,
    /// Last stream failed; nothing was committed.
    Error,
}

impl LifecycleState {
    /// Whether a stream is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, LifecycleState::Loading | LifecycleState::Streaming)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Loading => "loading",
            LifecycleState::Streaming => "streaming",
            LifecycleState::Done => "done",
            LifecycleState::Error => "error",
        };
        f.write_str(name)
    }
}
