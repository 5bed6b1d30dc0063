//! Typed events of the assistant stream.
//!
//! One variant per wire frame kind. Frames arrive as SSE events whose
//! `event:` field names the kind and whose `data:` field carries JSON.

use crate::error::{AssistError, Result};
use crate::reference::Reference;
use serde::Deserialize;

/// A decoded stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Backend conversation identity, sent first.
    Meta { conversation_id: String },
    /// Retrieved references; a later set replaces an earlier one.
    References(Vec<Reference>),
    /// Next piece of answer text.
    ContentDelta(String),
    /// Answer complete.
    Done,
    /// Backend-signaled failure.
    Error { message: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaPayload {
    conversation_id: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

impl StreamEvent {
    /// Whether no further frame may follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error { .. })
    }

    /// Decodes one frame.
    ///
    /// Unknown kinds and undecodable payloads are protocol errors. An `error`
    /// frame whose payload is not the expected object still counts as a
    /// backend error, with the raw payload as its message.
    pub fn from_frame(kind: &str, data: &str) -> Result<Self> {
        match kind {
            "meta" => {
                let payload: MetaPayload = decode(kind, data)?;
                Ok(StreamEvent::Meta {
                    conversation_id: payload.conversation_id,
                })
            }
            "references" => Ok(StreamEvent::References(decode(kind, data)?)),
            "content" => Ok(StreamEvent::ContentDelta(decode(kind, data)?)),
            "done" => Ok(StreamEvent::Done),
            "error" => {
                let message = serde_json::from_str::<ErrorPayload>(data)
                    .map(|payload| payload.message)
                    .unwrap_or_else(|_| data.trim().to_string());
                Ok(StreamEvent::Error { message })
            }
            other => Err(AssistError::protocol(format!(
                "unknown event kind '{other}'"
            ))),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(kind: &str, data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|err| {
        AssistError::protocol(format!("malformed '{kind}' payload: {err}"))
    })
}
