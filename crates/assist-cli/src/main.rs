use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assist_interaction::ClientConfig;

mod commands;
mod helper;
mod render;

#[derive(Parser)]
#[command(name = "assist")]
#[command(about = "Portal assistant - streaming conversational search", long_about = None)]
struct Cli {
    /// Streaming search endpoint (overrides config and PORTAL_ASSIST_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Portal root used for source links (overrides config and PORTAL_ASSIST_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug output to stderr when RUST_LOG is not set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer with its sources
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print the committed answer as JSON instead of streaming text
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive conversation
    Chat,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_portal_base_url(base_url);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Ask { query, json } => commands::ask::run(&config, &query.join(" "), json).await,
        Commands::Chat => commands::chat::run(&config).await,
    }
}
