//! Error types for the debate engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DebateError>;

#[derive(Debug, Error)]
pub enum DebateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("No agent registered for {0}")]
    UnknownAgent(String),

    #[error("Config error: {0}")]
    Config(String),
}
