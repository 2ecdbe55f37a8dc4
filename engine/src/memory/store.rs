//! SQLite-backed memory store
//!
//! Persists facts with their embeddings and ranks them by cosine similarity
//! against the embedded query. The fact population is small (personal facts
//! about users, not documents), so ranking happens in process over a full
//! scan instead of an index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::{MemoryError, MemoryStore, Result, ScoredFact};
use crate::db::FactRepository;
use crate::llm::Embedder;

pub struct SqliteMemoryStore {
    facts: FactRepository,
    embedder: Arc<dyn Embedder>,
}

impl SqliteMemoryStore {
    pub fn new(facts: FactRepository, embedder: Arc<dyn Embedder>) -> Self {
        Self { facts, embedder }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed(text)
            .await
            .map_err(|e| MemoryError::Embedding(e.to_string()))
    }
}

#[async_trait]
impl MemoryStore for SqliteMemoryStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFact>> {
        let query_embedding = self.embed(query).await?;
        let rows = self
            .facts
            .all()
            .await
            .map_err(|e| MemoryError::Store(e.to_string()))?;

        let mut scored: Vec<ScoredFact> = rows
            .into_iter()
            .map(|row| ScoredFact {
                score: similarity(&query_embedding, &row.embedding),
                content: row.content,
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn add(&self, content: &str, created_at: DateTime<Utc>) -> Result<()> {
        let embedding = self.embed(content).await?;
        self.facts
            .insert(
                &Uuid::new_v4().to_string(),
                content,
                &created_at.to_rfc3339(),
                &embedding,
            )
            .await
            .map_err(|e| MemoryError::Store(e.to_string()))
    }
}

/// Cosine similarity clamped into [0, 1].
///
/// Text embeddings from the models in use sit in the non-negative half of
/// that range; the clamp guards the score contract against pathological
/// vectors rather than shifting the scale.
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::llm::LlmError;
    use tempfile::TempDir;

    #[test]
    fn similarity_of_identical_vectors_is_one() {
        let v = vec![0.6, 0.8];
        assert!((similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_of_orthogonal_vectors_is_zero() {
        assert_eq!(similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn similarity_handles_degenerate_inputs() {
        assert_eq!(similarity(&[], &[]), 0.0);
        assert_eq!(similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn opposed_vectors_clamp_to_zero() {
        assert_eq!(similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
    }

    /// Embedder stub mapping known texts to fixed unit vectors
    struct AxisEmbedder;

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, LlmError> {
            Ok(match text {
                "Lives in Madrid" => vec![1.0, 0.0, 0.0],
                "Works as an engineer" => vec![0.0, 1.0, 0.0],
                "where does the user live" => vec![0.9, 0.1, 0.0],
                _ => vec![0.0, 0.0, 1.0],
            })
        }
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("memory.db")).await.unwrap();
        let store =
            SqliteMemoryStore::new(FactRepository::new(db.pool().clone()), Arc::new(AxisEmbedder));

        store.add("Lives in Madrid", Utc::now()).await.unwrap();
        store.add("Works as an engineer", Utc::now()).await.unwrap();

        let results = store.search("where does the user live", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "Lives in Madrid");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn search_truncates_to_k() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("memory.db")).await.unwrap();
        let store =
            SqliteMemoryStore::new(FactRepository::new(db.pool().clone()), Arc::new(AxisEmbedder));

        store.add("Lives in Madrid", Utc::now()).await.unwrap();
        store.add("Works as an engineer", Utc::now()).await.unwrap();
        store.add("Has two cats", Utc::now()).await.unwrap();

        let results = store.search("where does the user live", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
