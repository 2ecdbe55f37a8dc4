//! Lino Engine Library
//!
//! This library provides the core functionality of the Lino conversation
//! engine. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// Database persistence module
pub mod db;

/// Language model port and adapters
pub mod llm;

/// Long-term memory gateway and store
pub mod memory;

/// Issue tracker port and adapter
pub mod ticketing;

/// Conversation pipeline module
pub mod pipeline;

/// Background task registry
pub mod background;

/// System prompt texts
pub mod prompts;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
