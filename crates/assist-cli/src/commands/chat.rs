use std::io;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use assist_application::SearchLifecycleController;
use assist_core::session::LifecycleState;
use assist_interaction::{ClientConfig, StreamingRequestClient};

use super::stream_answer;
use crate::helper::ChatHelper;
use crate::render::{write_history, write_sources};

fn print_help() {
    println!("{}", "Type a question, or one of:".bright_black());
    println!("{}", "  /new      start a new conversation".bright_black());
    println!("{}", "  /history  show the conversation so far".bright_black());
    println!("{}", "  /sources  show the sources of the last answer".bright_black());
    println!("{}", "  /quit     exit".bright_black());
}

/// Interactive conversation with the assistant.
pub async fn run(config: &ClientConfig) -> Result<()> {
    let client = StreamingRequestClient::new(config)?;
    let endpoint = client.endpoint().to_string();
    let controller = SearchLifecycleController::new(Arc::new(client));

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!("{}", "=== Portal Assistant ===".bright_magenta().bold());
    println!("{}", format!("Connected to {endpoint}").bright_black());
    print_help();
    println!();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        match input {
            "/quit" | "quit" | "exit" => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            "/help" => print_help(),
            "/new" => {
                controller.new_conversation();
                println!("{}", "Started a new conversation.".bright_green());
            }
            "/history" => {
                let snapshot = controller.snapshot();
                if snapshot.turns.is_empty() {
                    println!("{}", "No conversation yet.".bright_black());
                } else {
                    if let Some(id) = &snapshot.conversation_id {
                        println!("{}", format!("conversation {id}").bright_black());
                    }
                    write_history(&mut io::stdout(), &snapshot.turns)?;
                }
            }
            "/sources" => {
                let snapshot = controller.snapshot();
                match snapshot.last_answer() {
                    Some(answer) if !answer.references.is_empty() => {
                        write_sources(&mut io::stdout(), &answer.references, &config.portal_base_url)?
                    }
                    _ => println!("{}", "No sources for the last answer.".bright_black()),
                }
            }
            command if command.starts_with('/') => {
                println!("{}", format!("Unknown command: {command}").bright_black());
            }
            query => ask(&controller, query, &config.portal_base_url).await,
        }
    }

    Ok(())
}

async fn ask(controller: &SearchLifecycleController, query: &str, base_url: &str) {
    let snapshot = match stream_answer(controller, query, false).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("{}", format!("Error: {err}").red());
            return;
        }
    };

    match snapshot.state {
        LifecycleState::Done => {
            if let Some(answer) = snapshot.last_answer() {
                if !answer.references.is_empty() {
                    println!();
                    if let Err(err) = write_sources(&mut io::stdout(), &answer.references, base_url) {
                        eprintln!("{}", format!("Error: {err}").red());
                    }
                }
            }
        }
        _ => {
            let message = snapshot
                .error
                .unwrap_or_else(|| "assistant stream ended without an answer".to_string());
            eprintln!("{}", format!("Error: {message}").red());
        }
    }
    println!();
}
