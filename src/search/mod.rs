//! Web search client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::Result;

/// Text search over the open web. Empty result lists are normal and Ok.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

/// Tavily search API client.
pub struct TavilyClient {
    http: Client,
    config: SearchConfig,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

impl TavilyClient {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let request = serde_json::json!({
            "api_key": self.config.api_key,
            "query": query,
            "max_results": self.config.max_results,
            "search_depth": "advanced",
            "include_answer": true,
        });

        let resp = self
            .http
            .post("https://api.tavily.com/search")
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            tracing::warn!("Search returned status {} for '{}'", resp.status(), query);
            return Ok(Vec::new());
        }

        let body: TavilyResponse = resp.json().await?;

        let mut snippets = Vec::new();
        if let Some(answer) = body.answer {
            if !answer.is_empty() {
                snippets.push(answer);
            }
        }
        for r in body.results {
            snippets.push(format!("{}: {}", r.title, r.content));
        }
        Ok(snippets)
    }
}
