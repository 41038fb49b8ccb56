//! LLMFlow agent CLI: a REPL over the chain orchestrator.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agent_tools::default_registry;
use ollama_oracle::{OllamaConfig, OllamaOracle};
use oracle_core::{ConversationMemory, MemoryMessage, Oracle};
use orchestrator::ChainOrchestrator;

#[derive(Debug, Parser)]
#[command(name = "llmflow")]
#[command(about = "Chain-orchestrated tool agent over a local Ollama model")]
struct Args {
    /// Ollama model name. Falls back to OLLAMA_MODEL env.
    #[arg(long)]
    model: Option<String>,

    /// Ollama API URL. Falls back to OLLAMA_URL env.
    #[arg(long)]
    url: Option<String>,

    /// Answer a single query and exit instead of starting the REPL.
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading configuration; ignore a missing file.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = OllamaConfig::from_env()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(url) = args.url {
        config.api_url = url;
    }

    let oracle = Arc::new(OllamaOracle::new(config)?);
    if !oracle.is_ready().await {
        error!("Ollama is not reachable at {}", oracle.config().api_url);
        return Err("Ollama endpoint not reachable".into());
    }

    info!(
        "Agent ready: model {} at {}",
        oracle.config().model,
        oracle.config().api_url
    );

    let registry = Arc::new(default_registry());
    let memory = Arc::new(ConversationMemory::new());
    let orchestrator =
        ChainOrchestrator::new(oracle, registry).with_usage_sink(memory.clone());

    if let Some(query) = args.query {
        let reply = answer(&orchestrator, &memory, &query).await;
        println!("{}", reply);
        return Ok(());
    }

    repl(&orchestrator, &memory).await
}

/// Read queries from stdin until EOF or an exit command.
async fn repl(
    orchestrator: &ChainOrchestrator,
    memory: &Arc<ConversationMemory>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("llmflow agent. Type a question, or 'quit' to leave.");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = answer(orchestrator, memory, query).await;
        println!("{}\n", reply);
    }

    println!("Bye.");
    Ok(())
}

/// Process one query, folding recent conversation context into the prompt.
async fn answer(
    orchestrator: &ChainOrchestrator,
    memory: &Arc<ConversationMemory>,
    query: &str,
) -> String {
    memory.add_message(MemoryMessage::user(query)).await;

    let context = memory.relevant_context().await;
    let prompt = if context.is_empty() {
        query.to_string()
    } else {
        format!("{}\n\nRecent conversation context:\n{}", query, context)
    };

    let reply = match orchestrator.process(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Query failed: {}", e);
            format!("Sorry, I could not process that: {}", e)
        }
    };

    memory.add_message(MemoryMessage::assistant(&reply)).await;
    reply
}
