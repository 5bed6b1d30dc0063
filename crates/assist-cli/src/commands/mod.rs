pub mod ask;
pub mod chat;

use std::io;

use anyhow::{Result, bail};

use assist_application::{ControllerSnapshot, SearchLifecycleController};
use assist_core::session::LifecycleState;

use crate::render::StreamPrinter;

/// Submits `query` and follows the controller until the stream settles.
///
/// The answer is printed to stdout while it streams unless `quiet` is set.
/// Returns the settled snapshot; callers inspect `state` for the outcome.
pub(crate) async fn stream_answer(
    controller: &SearchLifecycleController,
    query: &str,
    quiet: bool,
) -> Result<ControllerSnapshot> {
    let mut revisions = controller.subscribe();
    let generation = controller.submit_query(query)?;
    let mut printer = StreamPrinter::new(io::stdout());

    loop {
        let snapshot = controller.snapshot();
        if snapshot.generation != generation {
            bail!("query was superseded");
        }

        match snapshot.state {
            LifecycleState::Loading => {}
            LifecycleState::Streaming => {
                if !quiet {
                    printer.update(&snapshot.pending_content)?;
                }
            }
            LifecycleState::Done => {
                if let Some(answer) = snapshot.last_answer().filter(|_| !quiet) {
                    printer.finish(&answer.content)?;
                }
                return Ok(snapshot);
            }
            LifecycleState::Error | LifecycleState::Idle => return Ok(snapshot),
        }

        if revisions.changed().await.is_err() {
            bail!("assistant controller closed");
        }
    }
}
