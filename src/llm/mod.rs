//! LLM completion client
//!
//! One trait, one HTTP implementation against the OpenAI-compatible chat
//! endpoint the supported providers all speak. Agents depend on the trait
//! only, so tests swap in scripted completions.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::LlmConfig;
use crate::error::{DebateError, Result};

/// Opaque text-in/text-out completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client with per-provider defaults.
pub struct ChatClient {
    http: Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> (String, String) {
        let cfg = &self.config;
        match cfg.provider.to_lowercase().as_str() {
            "openai" | "gpt" => (
                cfg.base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com".to_string()),
                cfg.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
            ),
            "ollama" => (
                cfg.base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                cfg.model.clone().unwrap_or_else(|| "qwen2.5:14b".to_string()),
            ),
            _ => (
                cfg.base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
                cfg.model
                    .clone()
                    .unwrap_or_else(|| "deepseek-chat".to_string()),
            ),
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let (base_url, model) = self.endpoint();

        let request = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
        });

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url))
            .header("content-type", "application/json");

        if !self.config.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let resp: serde_json::Value = req.json(&request).send().await?.json().await?;

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DebateError::Api("Empty LLM response".into()))
    }
}

#[async_trait]
impl CompletionClient for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        // One retry on transport-level failure; malformed payloads are not
        // worth retrying.
        match self.request(prompt).await {
            Ok(text) => Ok(text),
            Err(DebateError::Http(e)) => {
                tracing::debug!("LLM request failed, retrying once: {}", e);
                self.request(prompt).await
            }
            Err(e) => Err(e),
        }
    }
}
