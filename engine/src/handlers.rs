//! Command handlers
//!
//! Implements the CLI commands: the interactive chat loop, the status
//! report, and configuration inspection. Port construction happens here so
//! the engine itself stays free of ambient clients.

use anyhow::{Context, Result};
use sdk::errors::{AssistantError, LinoErrorExt};
use sdk::types::{ConversationState, TurnRole};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::config::Config;
use crate::db::{Database, FactRepository};
use crate::llm::embeddings::GeminiEmbedder;
use crate::llm::GeminiClient;
use crate::memory::SqliteMemoryStore;
use crate::pipeline::Orchestrator;
use crate::secrets::{keys, SecretStore};
use crate::ticketing::LinearClient;

const GREETING: &str =
    "Hey, Lino here. I can chat, create tickets, or pull up the team's issues. What's up?";

/// Wire the orchestrator to its production ports.
async fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let secrets = SecretStore::new();
    let gemini_key = secrets.get(keys::GEMINI_API_KEY)?;
    let linear_key = secrets.get(keys::LINEAR_API_KEY)?;

    let llm = Arc::new(GeminiClient::new(&config.llm, gemini_key.clone()));
    let embedder = Arc::new(GeminiEmbedder::new(&config.llm, gemini_key));

    let db = Database::new(&config.db_path()).await?;
    let store = Arc::new(SqliteMemoryStore::new(
        FactRepository::new(db.pool().clone()),
        embedder,
    ));

    let ticketing = Arc::new(LinearClient::new(&config.ticketing, linear_key));

    Ok(Orchestrator::new(
        llm,
        store,
        ticketing,
        config.memory,
        config.retry.policy(),
    ))
}

/// Interactive chat REPL over the orchestrator.
pub async fn handle_chat(config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = ConversationState::new();

    stdout
        .write_all(format!("lino: {GREETING}\n").as_bytes())
        .await?;

    loop {
        stdout.write_all(b"you: ").await?;
        stdout.flush().await?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        state.push_user(message);
        state = orchestrator.run(state).await;

        if let Some(turn) = state.turns.last().filter(|t| t.role == TurnRole::Assistant) {
            stdout
                .write_all(format!("lino: {}\n", turn.content).as_bytes())
                .await?;
            if let Some(params) = &turn.params {
                stdout
                    .write_all(
                        format!(
                            "      [ticket {}: {}{}]\n",
                            params.task_id,
                            params.task_name,
                            params
                                .assignee_email
                                .as_deref()
                                .map(|email| format!(", assigned to {email}"))
                                .unwrap_or_default()
                        )
                        .as_bytes(),
                    )
                    .await?;
            }
        }
    }

    // Let in-flight memory writes land before the process exits.
    info!("Draining background memory writes");
    orchestrator.background().drain().await;
    Ok(())
}

/// Report on configuration, credentials, and the memory database.
pub async fn handle_status(config: &Config) -> Result<()> {
    println!("Lino status");
    println!("  config: ok (data dir {})", config.core.data_dir.display());

    let secrets = SecretStore::new();
    report_check("gemini credentials", secrets.get(keys::GEMINI_API_KEY).map(|_| ()));
    report_check("linear credentials", secrets.get(keys::LINEAR_API_KEY).map(|_| ()));

    match Database::new(&config.db_path()).await {
        Ok(db) => {
            let count = FactRepository::new(db.pool().clone())
                .count()
                .await
                .unwrap_or(0);
            println!("  memory db: ok ({count} facts)");
        }
        Err(e) => {
            let err = AssistantError::Database(e.to_string());
            println!("  memory db: FAILED ({})", err.user_hint());
        }
    }

    if config.ticketing.team_name.is_empty() {
        println!("  ticketing: no team configured (set ticketing.team_name)");
    } else {
        println!("  ticketing: team '{}'", config.ticketing.team_name);
    }

    Ok(())
}

fn report_check(name: &str, result: std::result::Result<(), AssistantError>) {
    match result {
        Ok(()) => println!("  {name}: ok"),
        Err(e) => {
            let kind = if e.is_recoverable() { "degraded" } else { "FAILED" };
            println!("  {name}: {kind} ({})", e.user_hint());
        }
    }
}

/// Print the configuration file location.
pub fn handle_config_path() {
    println!("{}", Config::default_path().display());
}

/// Print the effective configuration as TOML.
pub fn handle_config_show(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{rendered}");
    Ok(())
}
