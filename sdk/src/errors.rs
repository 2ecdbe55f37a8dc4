//! Error types and handling
//!
//! This module provides the error type shared across the Lino workspace.
//! All errors implement the `LinoErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Error messages are written to be safe to display to end users: no API keys,
//! no raw payloads, no internal file paths.

use thiserror::Error;

/// Trait for Lino error extensions
///
/// Provides additional context for errors: a hint that is safe to show to end
/// users, and whether the condition is worth retrying. The CLI uses both when
/// reporting startup and health-check failures.
pub trait LinoErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require fixing configuration or credentials first.
    fn is_recoverable(&self) -> bool;
}

/// Main assistant error type
///
/// Represents the failure categories that can surface outside the engine:
/// configuration problems, missing credentials, and failures of the three
/// external ports (classification, memory, ticketing).
#[derive(Debug, Error)]
pub enum AssistantError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Credential errors
    #[error("Missing secret: {0}")]
    MissingSecret(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Classification port errors
    #[error("Classifier error: {0}")]
    Classifier(String),

    // Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    // Memory port errors
    #[error("Memory error: {0}")]
    Memory(String),

    // Ticketing port errors
    #[error("Ticketing error: {0}")]
    Ticketing(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinoErrorExt for AssistantError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::MissingSecret(_) => {
                "Set the API key in the environment or the system keyring"
            }
            Self::Database(_) => "Memory database unavailable. Check the data directory",
            Self::Classifier(_) => "Language model unavailable. Check your API key and network",
            Self::Embedding(_) => "Embedding service unavailable. Check your API key and network",
            Self::Memory(_) => "Long-term memory unavailable. Conversation continues without it",
            Self::Ticketing(_) => "Issue tracker unreachable. Check your API key and network",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Fixing these requires operator intervention
            Self::Config(_) | Self::MissingSecret(_) => false,

            // All other errors are potentially transient
            _ => true,
        }
    }
}
