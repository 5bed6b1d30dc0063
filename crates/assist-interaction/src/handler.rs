//! Callback and cancellation seams of a stream.

use assist_core::reference::Reference;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Receives the typed events of one stream, in arrival order.
///
/// Callbacks run on the stream's tokio task and must not block. After
/// `on_done` or `on_error` no further callback is made for that stream.
pub trait StreamHandler: Send + Sync {
    fn on_meta(&self, conversation_id: String);
    fn on_references(&self, references: Vec<Reference>);
    fn on_content_delta(&self, text: String);
    fn on_done(&self);
    fn on_error(&self, message: String);
}

/// Cancels one opened stream.
///
/// Cancellation is checked before each frame is dispatched, so once the
/// stream task observes it no further callback is made. A callback already
/// running on another thread when `cancel()` is called may still complete;
/// handlers that must ignore it need their own guard. The HTTP transfer
/// itself is aborted as soon as its task next polls.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    token: CancellationToken,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Something that can open an assistant stream.
///
/// Implemented by [`crate::StreamingRequestClient`]; tests drive the
/// lifecycle controller through scripted implementations.
pub trait StreamOpener: Send + Sync {
    /// Starts a stream for `query` and returns immediately.
    ///
    /// `query` must already be trimmed and non-empty. Omitting
    /// `conversation_id` starts a new backend conversation.
    fn open(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        handler: Arc<dyn StreamHandler>,
    ) -> CancellationHandle;
}
