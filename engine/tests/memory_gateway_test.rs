//! Integration tests for the memory gateway over the SQLite store
//!
//! Exercises the full write-dedup and read-filter policy with a real
//! database and a deterministic embedder, without any HTTP in the loop.

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use lino_engine::config::MemoryConfig;
use lino_engine::db::{Database, FactRepository};
use lino_engine::llm::{Embedder, LanguageModel, LlmError, OutputSchema};
use lino_engine::memory::{MemoryGateway, MemoryStore, SqliteMemoryStore};
use sdk::types::Turn;

/// Deterministic embedder: similar statements share a direction.
struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let lowered = text.to_lowercase();
        Ok(if lowered.contains("madrid") {
            vec![1.0, 0.05, 0.0]
        } else if lowered.contains("engineer") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 1.0]
        })
    }
}

/// Model stub that extracts a fixed fact from every message
struct ExtractingModel(&'static str);

#[async_trait]
impl LanguageModel for ExtractingModel {
    async fn complete(&self, _system: &str, _history: &[Turn]) -> Result<String, LlmError> {
        Ok(String::new())
    }

    async fn classify(
        &self,
        _system: &str,
        _history: &[Turn],
        _schema: &OutputSchema,
    ) -> Result<serde_json::Value, LlmError> {
        Ok(serde_json::json!({ "should_save": true, "content": self.0 }))
    }
}

async fn store_in(dir: &TempDir) -> Arc<SqliteMemoryStore> {
    let db = Database::new(&dir.path().join("memory.db")).await.unwrap();
    Arc::new(SqliteMemoryStore::new(
        FactRepository::new(db.pool().clone()),
        Arc::new(StubEmbedder),
    ))
}

#[tokio::test]
async fn equivalent_fact_is_written_once() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;

    let gateway = MemoryGateway::new(
        Arc::new(ExtractingModel("Lives in Madrid")),
        Arc::clone(&store) as Arc<dyn MemoryStore>,
        MemoryConfig::default(),
    );

    gateway.extract_and_save("Remember that I live in Madrid").await.unwrap();
    // Same fact phrased again: near-identical embedding, above the
    // compare threshold, so no second row.
    gateway.extract_and_save("I'm living in Madrid these days").await.unwrap();

    let hits = store.search("madrid", 5).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn distinct_facts_accumulate() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;

    let first = MemoryGateway::new(
        Arc::new(ExtractingModel("Lives in Madrid")),
        Arc::clone(&store) as Arc<dyn MemoryStore>,
        MemoryConfig::default(),
    );
    first.extract_and_save("I live in Madrid").await.unwrap();

    let second = MemoryGateway::new(
        Arc::new(ExtractingModel("Works as an engineer")),
        Arc::clone(&store) as Arc<dyn MemoryStore>,
        MemoryConfig::default(),
    );
    second.extract_and_save("I work as an engineer").await.unwrap();

    let hits = store.search("anything", 5).await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn retrieval_returns_only_relevant_facts() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir).await;

    let gateway = MemoryGateway::new(
        Arc::new(ExtractingModel("Lives in Madrid")),
        Arc::clone(&store) as Arc<dyn MemoryStore>,
        MemoryConfig::default(),
    );
    gateway.extract_and_save("I live in Madrid").await.unwrap();

    // A Madrid-flavored question clears the return threshold...
    let context = gateway.get_relevant("what do you know about madrid?").await;
    assert_eq!(context.as_deref(), Some("- Lives in Madrid"));

    // ...an unrelated one does not.
    assert_eq!(gateway.get_relevant("how's the weather?").await, None);
}
