//! Language model port
//!
//! Defines the classification/completion contract the pipeline depends on.
//! The engine never talks to a model API directly: every stage that needs
//! language goes through the `LanguageModel` trait, which keeps the
//! orchestration core testable with scripted models.

use async_trait::async_trait;
use sdk::types::Turn;
use serde::de::DeserializeOwned;

pub mod embeddings;
pub mod gemini;
pub mod outputs;

pub use embeddings::Embedder;
pub use gemini::GeminiClient;

/// Result type for language model operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur during language model operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Describes the JSON shape a classification call must return.
///
/// The schema value follows the OpenAPI subset Gemini accepts in
/// `responseSchema`; scripted test models only look at `name`.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    /// Stable identifier of the shape, used for logging and test scripting
    pub name: &'static str,

    /// JSON schema the model output must conform to
    pub schema: serde_json::Value,
}

impl OutputSchema {
    pub fn new(name: &'static str, schema: serde_json::Value) -> Self {
        Self { name, schema }
    }
}

/// Port to the language model service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-form completion over the turn history.
    async fn complete(&self, system: &str, history: &[Turn]) -> Result<String>;

    /// Structured classification over the turn history. The returned value
    /// conforms to `schema` (the adapter enforces this server-side; scripted
    /// models must uphold it themselves).
    async fn classify(
        &self,
        system: &str,
        history: &[Turn],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value>;
}

/// Run a classification and deserialize the result into a typed value.
pub async fn classify_as<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    system: &str,
    history: &[Turn],
    schema: &OutputSchema,
) -> Result<T> {
    let value = model.classify(system, history, schema).await?;
    serde_json::from_value(value)
        .map_err(|e| LlmError::Parse(format!("{} output did not match schema: {e}", schema.name)))
}
