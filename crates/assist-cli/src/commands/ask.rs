use std::io;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde_json::json;

use assist_application::SearchLifecycleController;
use assist_core::reference;
use assist_core::session::LifecycleState;
use assist_interaction::{ClientConfig, StreamingRequestClient};

use super::stream_answer;
use crate::render::write_sources;

pub async fn run(config: &ClientConfig, query: &str, as_json: bool) -> Result<()> {
    let client = StreamingRequestClient::new(config)?;
    let controller = SearchLifecycleController::new(Arc::new(client));

    let snapshot = stream_answer(&controller, query, as_json).await?;
    if snapshot.state != LifecycleState::Done {
        return Err(anyhow!(
            snapshot
                .error
                .unwrap_or_else(|| "assistant stream ended without an answer".to_string())
        ));
    }

    let answer = snapshot
        .last_answer()
        .context("assistant finished without committing an answer")?;

    if as_json {
        let links: Vec<Option<String>> = answer
            .references
            .iter()
            .map(|item| reference::resolve(item).map(|link| link.absolute(&config.portal_base_url)))
            .collect();
        let output = json!({
            "conversationId": snapshot.conversation_id,
            "answer": answer,
            "links": links,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !answer.references.is_empty() {
        println!();
        write_sources(&mut io::stdout(), &answer.references, &config.portal_base_url)?;
    }

    Ok(())
}
