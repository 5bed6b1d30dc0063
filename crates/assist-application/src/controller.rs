//! Search lifecycle controller.
//!
//! Turns submitted queries into streams and streams into committed turns.
//!
//! ```text
//! Idle ──submit──▶ Loading ──meta──▶ Streaming ──done──▶ Done
//!                     │                  │
//!                     └──────error───────┴──────────────▶ Error
//! any ──submit──▶ Loading        any ──new_conversation──▶ Idle
//! ```
//!
//! Every `submit_query` bumps a generation counter and every stream handler
//! carries the generation it was opened with. Events from an older
//! generation are dropped under the controller lock, so a superseded stream
//! can never touch the session even if its transport keeps delivering.

use assist_core::markdown;
use assist_core::reference::Reference;
use assist_core::session::{ConversationSession, LifecycleState, Turn};
use assist_core::{AssistError, Result};
use assist_interaction::{CancellationHandle, StreamHandler, StreamOpener};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub state: LifecycleState,
    pub conversation_id: Option<String>,
    /// Committed turns in order.
    pub turns: Vec<Turn>,
    /// Raw text received so far for the running answer.
    pub pending_content: String,
    /// Latest reference set of the running answer.
    pub pending_references: Vec<Reference>,
    /// Message of the last failed stream.
    pub error: Option<String>,
    pub generation: u64,
}

impl ControllerSnapshot {
    /// Pending answer with its markdown repaired, ready to render.
    pub fn rendered_pending(&self) -> String {
        markdown::normalize(&self.pending_content)
    }

    pub fn last_answer(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_assistant())
    }
}

#[derive(Default)]
struct ControllerInner {
    session: ConversationSession,
    state: LifecycleState,
    generation: u64,
    active: Option<CancellationHandle>,
    content: String,
    references: Vec<Reference>,
    error: Option<String>,
}

impl ControllerInner {
    fn clear_buffers(&mut self) {
        self.content.clear();
        self.references.clear();
    }

    /// Moves a loading stream to streaming. Returns false when the current
    /// generation is not expecting frames anymore.
    fn begin_streaming(&mut self) -> bool {
        match self.state {
            LifecycleState::Loading => {
                self.state = LifecycleState::Streaming;
                true
            }
            LifecycleState::Streaming => true,
            _ => false,
        }
    }

    fn on_meta(&mut self, conversation_id: String) {
        if !self.state.is_busy() {
            return;
        }
        if !self.session.assign_conversation_id(conversation_id.as_str())
            && self.session.conversation_id() != Some(conversation_id.as_str())
        {
            warn!(
                current = self.session.conversation_id().unwrap_or_default(),
                received = %conversation_id,
                "ignoring conversation id change"
            );
        }
        self.begin_streaming();
    }

    fn on_references(&mut self, references: Vec<Reference>) {
        if self.begin_streaming() {
            self.references = references;
        }
    }

    fn on_content_delta(&mut self, text: String) {
        if self.begin_streaming() {
            self.content.push_str(&text);
        }
    }

    fn on_done(&mut self) {
        if !self.begin_streaming() {
            return;
        }
        self.active = None;
        let content = std::mem::take(&mut self.content);
        let references = std::mem::take(&mut self.references);

        match self.session.commit_assistant_turn(content, references) {
            Ok(()) => self.state = LifecycleState::Done,
            Err(err) => {
                warn!(error = %err, "could not commit assistant turn");
                self.state = LifecycleState::Error;
                self.error = Some(err.to_string());
            }
        }
    }

    fn on_error(&mut self, message: String) {
        self.active = None;
        self.clear_buffers();
        self.state = LifecycleState::Error;
        self.error = Some(message);
    }
}

struct Shared {
    inner: Mutex<ControllerInner>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        // Critical sections never panic halfway through a transition.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn apply<F>(&self, generation: u64, kind: &'static str, transition: F)
    where
        F: FnOnce(&mut ControllerInner),
    {
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(
                    kind,
                    stale = generation,
                    current = inner.generation,
                    "dropping event from superseded stream"
                );
                return;
            }
            transition(&mut *inner);
        }
        self.notify();
    }
}

/// Stream handler bound to one generation.
struct GenerationHandler {
    generation: u64,
    shared: Arc<Shared>,
}

impl StreamHandler for GenerationHandler {
    fn on_meta(&self, conversation_id: String) {
        self.shared
            .apply(self.generation, "meta", |inner| inner.on_meta(conversation_id));
    }

    fn on_references(&self, references: Vec<Reference>) {
        self.shared.apply(self.generation, "references", |inner| {
            inner.on_references(references)
        });
    }

    fn on_content_delta(&self, text: String) {
        self.shared
            .apply(self.generation, "content", |inner| inner.on_content_delta(text));
    }

    fn on_done(&self) {
        self.shared.apply(self.generation, "done", |inner| inner.on_done());
    }

    fn on_error(&self, message: String) {
        self.shared
            .apply(self.generation, "error", |inner| inner.on_error(message));
    }
}

/// Drives one conversation with the assistant.
///
/// At most one stream is in flight: submitting a query cancels the previous
/// stream before the new one is requested. Failed streams are not retried.
pub struct SearchLifecycleController {
    opener: Arc<dyn StreamOpener>,
    shared: Arc<Shared>,
}

impl SearchLifecycleController {
    pub fn new(opener: Arc<dyn StreamOpener>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            opener,
            shared: Arc::new(Shared {
                inner: Mutex::new(ControllerInner::default()),
                revision,
            }),
        }
    }

    /// Submits a query and returns the generation of its stream.
    ///
    /// The user turn is recorded immediately, before any response arrives.
    /// A blank query is rejected and changes nothing.
    pub fn submit_query(&self, text: &str) -> Result<u64> {
        let query = text.trim();
        if query.is_empty() {
            return Err(AssistError::invalid_query("query is empty"));
        }

        let (generation, previous, conversation_id) = {
            let mut inner = self.shared.lock();
            inner.session.append_user_turn(query);
            inner.generation += 1;
            inner.clear_buffers();
            inner.error = None;
            inner.state = LifecycleState::Loading;
            (
                inner.generation,
                inner.active.take(),
                inner.session.conversation_id().map(str::to_string),
            )
        };

        if let Some(previous) = previous {
            debug!(generation, "cancelling superseded stream");
            previous.cancel();
        }

        info!(
            generation,
            conversation_id = conversation_id.as_deref().unwrap_or("<new>"),
            "submitting query"
        );
        let handler = Arc::new(GenerationHandler {
            generation,
            shared: Arc::clone(&self.shared),
        });
        let handle = self
            .opener
            .open(query, conversation_id.as_deref(), handler);

        {
            let mut inner = self.shared.lock();
            if inner.generation == generation && inner.state.is_busy() {
                inner.active = Some(handle);
            } else if inner.generation != generation {
                handle.cancel();
            }
        }
        self.shared.notify();

        Ok(generation)
    }

    /// Discards the conversation and returns to `Idle`.
    ///
    /// The next query starts a new backend conversation.
    pub fn new_conversation(&self) {
        {
            let mut inner = self.shared.lock();
            if let Some(active) = inner.active.take() {
                active.cancel();
            }
            inner.generation += 1;
            inner.session.reset();
            inner.clear_buffers();
            inner.error = None;
            inner.state = LifecycleState::Idle;
            info!(session_id = inner.session.session_id(), "started new conversation");
        }
        self.shared.notify();
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.lock().state
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.shared
            .lock()
            .session
            .conversation_id()
            .map(str::to_string)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let inner = self.shared.lock();
        ControllerSnapshot {
            state: inner.state,
            conversation_id: inner.session.conversation_id().map(str::to_string),
            turns: inner.session.turns().to_vec(),
            pending_content: inner.content.clone(),
            pending_references: inner.references.clone(),
            error: inner.error.clone(),
            generation: inner.generation,
        }
    }

    /// Revision counter that changes on every observable update.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}

impl Drop for SearchLifecycleController {
    fn drop(&mut self) {
        if let Some(active) = self.shared.lock().active.take() {
            active.cancel();
        }
    }
}
