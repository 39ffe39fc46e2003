//! deck-server: HTTP service for slide generation and export.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{FeedbackStore, JsonFileFeedbackStore, MemoryFeedbackStore};
use deck_server::{build_router, AnthropicClient, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "deck-server")]
#[command(about = "Serve slide generation, PPTX export and feedback over HTTP")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "DECK_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// JSON file to keep feedback in (memory only when unset)
    #[arg(long, env = "DECK_FEEDBACK_FILE")]
    feedback_file: Option<PathBuf>,

    /// Upstream model, used when ANTHROPIC_API_KEY is set
    #[arg(long, env = "ANTHROPIC_MODEL")]
    model: Option<String>,

    /// Give up on the upstream model after this many seconds
    #[arg(long)]
    upstream_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let feedback: Arc<dyn FeedbackStore> = match &args.feedback_file {
        Some(path) => {
            log::info!("Storing feedback in {}", path.display());
            Arc::new(JsonFileFeedbackStore::new(path))
        }
        None => Arc::new(MemoryFeedbackStore::new()),
    };

    let mut state = AppState::new(feedback);
    match std::env::var("ANTHROPIC_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let mut client = AnthropicClient::new(key);
            if let Some(model) = &args.model {
                client = client.with_model(model);
            }
            if let Some(secs) = args.upstream_timeout_secs {
                client = client.with_timeout(Duration::from_secs(secs));
            }
            log::info!("Generating with upstream model {}", deck_server::LlmClient::model_name(&client));
            state = state.with_llm(Arc::new(client));
        }
        _ => log::info!("ANTHROPIC_API_KEY not set, generating with local heuristics"),
    }

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;
    Ok(())
}
