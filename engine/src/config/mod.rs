//! Configuration management
//!
//! Loads, validates, and manages the Lino configuration, stored in TOML
//! format at `~/.lino/config.toml`.
//!
//! # Configuration Sections
//!
//! - **core**: data directory, log level
//! - **llm**: language model endpoint and model names
//! - **memory**: similarity thresholds and retrieval depth
//! - **retry**: backoff policy applied to external calls
//! - **ticketing**: issue tracker endpoint and team
//!
//! The memory thresholds are deliberately configuration, not code constants:
//! both gates of the memory policy must be tunable per deployment.

use sdk::errors::AssistantError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::retry::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Long-term memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Retry policy for external calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Issue tracker settings
    #[serde(default)]
    pub ticketing: TicketingConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Data directory (holds the memory database)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Gemini API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model used for completions and classification
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Model used for fact embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

/// Long-term memory configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// A candidate fact whose best match scores above this is a duplicate
    /// and is not written
    #[serde(default = "default_compare_threshold")]
    pub compare_threshold: f32,

    /// Retrieved facts scoring at or below this are not injected
    #[serde(default = "default_return_threshold")]
    pub return_threshold: f32,

    /// How many facts to consider on the read path
    #[serde(default = "default_search_k")]
    pub search_k: usize,

    /// Maximum number of in-flight background memory writes
    #[serde(default = "default_background_capacity")]
    pub background_capacity: usize,
}

/// Retry configuration for external calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each retry
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Materialize this configuration as a retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

/// Issue tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketingConfig {
    /// GraphQL endpoint of the tracker
    #[serde(default = "default_ticketing_base_url")]
    pub base_url: String,

    /// Team whose tickets the assistant manages
    #[serde(default)]
    pub team_name: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lino")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_compare_threshold() -> f32 {
    0.7
}

fn default_return_threshold() -> f32 {
    0.5
}

fn default_search_k() -> usize {
    3
}

fn default_background_capacity() -> usize {
    32
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            compare_threshold: default_compare_threshold(),
            return_threshold: default_return_threshold(),
            search_k: default_search_k(),
            background_capacity: default_background_capacity(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            base_url: default_ticketing_base_url(),
            team_name: String::new(),
        }
    }
}

fn default_ticketing_base_url() -> String {
    "https://api.linear.app/graphql".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            llm: LlmConfig::default(),
            memory: MemoryConfig::default(),
            retry: RetryConfig::default(),
            ticketing: TicketingConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location: `~/.lino/config.toml`
    pub fn default_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Path of the memory database inside the data directory
    pub fn db_path(&self) -> PathBuf {
        self.core.data_dir.join("memory.db")
    }

    /// Load configuration from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, AssistantError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| AssistantError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default configuration file, creating it with defaults on
    /// first run.
    pub fn load_or_create() -> Result<Self, AssistantError> {
        let path = Self::default_path();
        if !path.exists() {
            let config = Config::default();
            config.write_to(&path)?;
            return Ok(config);
        }
        Self::load_from_path(&path)
    }

    /// Write this configuration to the given path, creating parent
    /// directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<(), AssistantError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::Config(format!("cannot serialize config: {e}")))?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<(), AssistantError> {
        for (name, value) in [
            ("memory.compare_threshold", self.memory.compare_threshold),
            ("memory.return_threshold", self.memory.return_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AssistantError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.memory.search_k == 0 {
            return Err(AssistantError::Config(
                "memory.search_k must be at least 1".to_string(),
            ));
        }
        if self.memory.background_capacity == 0 {
            return Err(AssistantError::Config(
                "memory.background_capacity must be at least 1".to_string(),
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(AssistantError::Config(format!(
                "retry.backoff_multiplier must be >= 1.0, got {}",
                self.retry.backoff_multiplier
            )));
        }
        Ok(())
    }
}
