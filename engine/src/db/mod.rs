//! Database persistence module
//!
//! SQLite-backed storage for long-term memory facts, using sqlx with WAL mode
//! so the fire-and-forget write path and the synchronous read path can
//! interleave safely across conversations.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub mod facts;

pub use facts::{FactRepository, FactRow};

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `db_path`.
    ///
    /// Enables WAL mode, creates the parent directory when missing, and runs
    /// the embedded migrations. Reopening after an unclean shutdown recovers
    /// automatically through SQLite's WAL replay.
    pub async fn new(db_path: &Path) -> Result<Self> {
        info!("Opening memory database at {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let connection_string = format!("sqlite:{}", db_path.display());
        let options = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        debug!("Database connection established");

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run the embedded schema migrations. Idempotent.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("../../migrations/001_facts.sql"))
            .execute(&self.pool)
            .await
            .context("Failed to execute migration 001_facts.sql")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checkpoint the WAL and close the pool. Call on graceful shutdown.
    pub async fn close(self) -> Result<()> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await
            .context("Failed to checkpoint WAL")?;
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&dir.path().join("memory.db")).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM facts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.db");

        let db = Database::new(&path).await.unwrap();
        db.close().await.unwrap();

        // Reopening runs migrations again over the same file
        let db = Database::new(&path).await.unwrap();
        db.close().await.unwrap();
    }
}
