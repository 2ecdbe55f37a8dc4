//! Long-term memory
//!
//! Two independent algorithms over the memory store:
//!
//! - the **write path** extracts a durable fact from a user message, skips it
//!   when a sufficiently similar fact already exists, and persists it
//!   otherwise;
//! - the **read path** retrieves the facts most similar to the current
//!   message and keeps only those above the relevance threshold.
//!
//! The write path runs fire-and-forget; its failures are logged and never
//! reach the user. The read path degrades to "no relevant memory" when the
//! store is unavailable, so a memory outage can never abort a turn.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sdk::types::Turn;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::MemoryConfig;
use crate::llm::outputs::MemoryVerdict;
use crate::llm::{classify_as, LanguageModel};
use crate::prompts;

pub mod store;

pub use store::SqliteMemoryStore;

/// Result type for memory store operations
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Errors that can occur against the memory store
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

/// A retrieved fact with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFact {
    pub content: String,

    /// Similarity in [0, 1], higher is closer
    pub score: f32,
}

/// Port to the fact store
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The `k` facts most similar to `query`, highest similarity first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFact>>;

    /// Persist a new fact
    async fn add(&self, content: &str, created_at: DateTime<Utc>) -> Result<()>;
}

/// Implements the dedup-on-write / threshold-on-read memory policy.
pub struct MemoryGateway {
    llm: Arc<dyn LanguageModel>,
    store: Arc<dyn MemoryStore>,
    config: MemoryConfig,
}

impl MemoryGateway {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn MemoryStore>,
        config: MemoryConfig,
    ) -> Self {
        Self { llm, store, config }
    }

    /// Write path: extract a durable fact from `message` and persist it
    /// unless an equivalent fact is already stored.
    ///
    /// Runs on the background registry; the returned error is for logging
    /// only and must never be surfaced to the user.
    pub async fn extract_and_save(&self, message: &str) -> anyhow::Result<()> {
        let verdict: MemoryVerdict = classify_as(
            self.llm.as_ref(),
            prompts::MEMORY_ANALYSIS_SYSTEM,
            &[Turn::user(message)],
            &MemoryVerdict::schema(),
        )
        .await?;

        let content = match verdict.content.as_deref().map(str::trim) {
            Some(content) if verdict.should_save && !content.is_empty() => content.to_string(),
            _ => {
                debug!("Message carries no durable fact, nothing saved");
                return Ok(());
            }
        };

        let existing = self.store.search(&content, 1).await?;
        if let Some(best) = existing.first() {
            if best.score > self.config.compare_threshold {
                info!(
                    score = best.score,
                    threshold = self.config.compare_threshold,
                    "Equivalent fact already stored, skipping write"
                );
                return Ok(());
            }
        }

        self.store.add(&content, Utc::now()).await?;
        debug!(fact = %content, "Stored new fact");
        Ok(())
    }

    /// Read path: the facts relevant to `message`, as a bulleted digest.
    ///
    /// Returns `None` when nothing scores above the relevance threshold,
    /// and also when the store fails, because missing memory must degrade
    /// the answer, not abort it.
    pub async fn get_relevant(&self, message: &str) -> Option<String> {
        let results = match self.store.search(message, self.config.search_k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Memory search failed, continuing without context");
                return None;
            }
        };

        let relevant: Vec<String> = results
            .into_iter()
            .filter(|fact| fact.score > self.config.return_threshold)
            .map(|fact| format!("- {}", fact.content))
            .collect();

        if relevant.is_empty() {
            None
        } else {
            Some(relevant.join("\n"))
        }
    }
}
