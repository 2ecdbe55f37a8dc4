//! Fact Repository
//!
//! Row-level access to the `facts` table. Facts are append-only; the
//! repository exposes inserts and full scans, and the memory store layers
//! similarity ranking on top.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A persisted fact with its embedding vector
#[derive(Debug, Clone)]
pub struct FactRow {
    pub id: String,
    pub content: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub embedding: Vec<f32>,
}

/// Repository for the append-only facts table
pub struct FactRepository {
    pool: SqlitePool,
}

impl FactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new fact. Facts are never updated or deleted.
    pub async fn insert(
        &self,
        id: &str,
        content: &str,
        created_at: &str,
        embedding: &[f32],
    ) -> Result<()> {
        sqlx::query("INSERT INTO facts (id, content, created_at, embedding) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(content)
            .bind(created_at)
            .bind(encode_embedding(embedding))
            .execute(&self.pool)
            .await
            .context("Failed to insert fact")?;
        Ok(())
    }

    /// Load every stored fact with its embedding.
    pub async fn all(&self) -> Result<Vec<FactRow>> {
        let rows = sqlx::query("SELECT id, content, created_at, embedding FROM facts")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load facts")?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            let blob: Vec<u8> = row.get("embedding");
            facts.push(FactRow {
                id: row.get("id"),
                content: row.get("content"),
                created_at: row.get("created_at"),
                embedding: decode_embedding(&blob),
            });
        }
        Ok(facts)
    }

    /// Number of stored facts
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM facts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count facts")?;
        Ok(row.0)
    }
}

/// Serialize an embedding as little-endian f32 bytes
fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Deserialize little-endian f32 bytes back into an embedding.
///
/// Trailing bytes that do not form a full f32 are ignored; they can only
/// appear if the row was corrupted outside this process.
fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
