//! Embedding service port and Gemini adapter
//!
//! Embeddings are consumed only by the memory store for similarity search;
//! nothing else in the engine sees vectors.

use async_trait::async_trait;
use serde_json::json;

use super::{LlmError, Result};
use crate::config::LlmConfig;
use crate::secrets::SecretString;

/// Port to the embedding service
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a short text into a vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Gemini `embedContent` adapter
pub struct GeminiEmbedder {
    base_url: String,
    model: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.embedding_model.clone(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose()
        );

        let payload = json!({
            "content": { "parts": [{ "text": text }] }
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(body),
                429 => LlmError::RateLimited,
                400 | 404 => LlmError::InvalidRequest(body),
                _ => LlmError::Unavailable(format!("embedding API error ({status}): {body}")),
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let values = data
            .get("embedding")
            .and_then(|e| e.get("values"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| LlmError::Parse("No embedding values in response".to_string()))?;

        values
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| LlmError::Parse("Non-numeric embedding value".to_string()))
            })
            .collect()
    }
}
