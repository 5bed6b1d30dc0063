//! Frame dispatch loop.
//!
//! Turns a body byte stream into handler callbacks and enforces the
//! per-stream guarantees: strict arrival order, nothing after cancellation,
//! and at most one terminal callback.

use crate::handler::{CancellationHandle, StreamHandler};
use crate::sse::{FrameDecoder, SseFrame};
use assist_core::AssistError;
use assist_core::session::StreamEvent;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct FrameDispatcher {
    handler: Arc<dyn StreamHandler>,
    handle: CancellationHandle,
    finished: bool,
    frames: usize,
}

impl FrameDispatcher {
    pub(crate) fn new(handler: Arc<dyn StreamHandler>, handle: CancellationHandle) -> Self {
        Self {
            handler,
            handle,
            finished: false,
            frames: 0,
        }
    }

    fn is_open(&self) -> bool {
        !self.finished && !self.handle.is_cancelled()
    }

    /// Decodes and delivers one frame. Returns whether dispatch continues.
    fn dispatch_frame(&mut self, frame: SseFrame) -> bool {
        if !self.is_open() {
            return false;
        }
        self.frames += 1;
        debug!(kind = %frame.event, index = self.frames, "stream frame");

        match StreamEvent::from_frame(&frame.event, &frame.data) {
            Ok(event) => self.deliver(event),
            Err(err) => self.fail(err),
        }
        self.is_open()
    }

    fn deliver(&mut self, event: StreamEvent) {
        if !self.is_open() {
            return;
        }
        if event.is_terminal() {
            self.finished = true;
        }

        match event {
            StreamEvent::Meta { conversation_id } => self.handler.on_meta(conversation_id),
            StreamEvent::References(references) => self.handler.on_references(references),
            StreamEvent::ContentDelta(text) => self.handler.on_content_delta(text),
            StreamEvent::Done => self.handler.on_done(),
            StreamEvent::Error { message } => {
                warn!(%message, "assistant backend reported an error");
                self.handler
                    .on_error(AssistError::backend(message).to_string())
            }
        }
    }

    /// Synthesizes the single terminal error of this stream.
    pub(crate) fn fail(&mut self, err: AssistError) {
        if !self.is_open() {
            return;
        }
        self.finished = true;
        warn!(error = %err, frames = self.frames, "assistant stream failed");
        self.handler.on_error(err.to_string());
    }
}

/// Reads `body` to the end, dispatching every decoded frame.
///
/// A body that ends before a `done` or `error` frame counts as a dropped
/// connection.
pub(crate) async fn dispatch_frames<S, B, E>(body: S, dispatcher: &mut FrameDispatcher)
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = pin!(body);
    let mut decoder = FrameDecoder::new();

    while let Some(chunk) = body.next().await {
        if !dispatcher.is_open() {
            return;
        }
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                dispatcher.fail(AssistError::transport(
                    None,
                    format!("stream interrupted: {err}"),
                ));
                return;
            }
        };
        let frames = match decoder.feed(chunk.as_ref()) {
            Ok(frames) => frames,
            Err(err) => {
                dispatcher.fail(err);
                return;
            }
        };
        for frame in frames {
            if !dispatcher.dispatch_frame(frame) {
                return;
            }
        }
    }

    match decoder.finish() {
        Ok(Some(frame)) => {
            if !dispatcher.dispatch_frame(frame) {
                return;
            }
        }
        Ok(None) => {}
        Err(err) => {
            dispatcher.fail(err);
            return;
        }
    }

    dispatcher.fail(AssistError::transport(
        None,
        "stream closed before completion",
    ));
}
