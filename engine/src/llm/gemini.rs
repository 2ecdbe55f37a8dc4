//! Gemini adapter for the language model port
//!
//! Talks to the Gemini `generateContent` API. Classification calls request
//! JSON output with a response schema so the model cannot return free text
//! where the pipeline expects structure.

use async_trait::async_trait;
use sdk::types::{Turn, TurnRole};
use serde_json::json;

use super::{LanguageModel, LlmError, OutputSchema, Result};
use crate::config::LlmConfig;
use crate::secrets::SecretString;

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Build the request payload: system instruction, turn history, and an
    /// optional structured-output constraint.
    fn payload(system: &str, history: &[Turn], schema: Option<&OutputSchema>) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Assistant => "model",
                    },
                    "parts": [{ "text": turn.content }]
                })
            })
            .collect();

        let mut payload = json!({
            "contents": contents,
            "systemInstruction": { "parts": [{ "text": system }] }
        });

        if let Some(schema) = schema {
            payload["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": schema.schema
            });
        }

        payload
    }

    async fn generate(&self, payload: serde_json::Value) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose()
        );

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
                _ => LlmError::Unavailable(format!("Gemini API error ({status}): {body}")),
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let parts = data
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| LlmError::Parse("No candidate parts in response".to_string()))?;

        let mut text = String::new();
        for part in parts {
            if let Some(chunk) = part.get("text").and_then(|t| t.as_str()) {
                text.push_str(chunk);
            }
        }

        if text.is_empty() {
            return Err(LlmError::Parse("Empty candidate text".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, system: &str, history: &[Turn]) -> Result<String> {
        self.generate(Self::payload(system, history, None)).await
    }

    async fn classify(
        &self,
        system: &str,
        history: &[Turn],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value> {
        let text = self
            .generate(Self::payload(system, history, Some(schema)))
            .await?;
        serde_json::from_str(&text).map_err(|e| {
            LlmError::Parse(format!("{} output was not valid JSON: {e}", schema.name))
        })
    }
}
