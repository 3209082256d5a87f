//! Configuration loading and validation
//!
//! Layered: TOML file first, then `DEBATE__`-prefixed environment variables
//! (e.g. `DEBATE__LLM__API_KEY`) override file values.

use anyhow::{Context, Result};
use config::{Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub agents: AgentToggles,
}

/// OpenAI-compatible chat completion endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// "deepseek", "openai" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// Overrides the provider's default model
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: None,
            model: None,
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_data_api_url")]
    pub data_api_url: String,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            clob_url: default_clob_url(),
            data_api_url: default_data_api_url(),
        }
    }
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_data_api_url() -> String {
    "https://data-api.polymarket.com".to_string()
}

/// Trader-flow aggregation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// How far back the raw-trade path looks
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Wallets kept after ranking by volume
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Max in-flight enrichment requests
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-trade notional floor (USD); smaller fills are noise
    #[serde(default = "default_min_trade_value")]
    pub min_trade_value: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            top_n: default_top_n(),
            concurrency: default_concurrency(),
            min_trade_value: default_min_trade_value(),
        }
    }
}

fn default_lookback_days() -> i64 {
    7
}

fn default_top_n() -> usize {
    5
}

fn default_concurrency() -> usize {
    8
}

fn default_min_trade_value() -> f64 {
    100.0
}

/// Which analyst agents join the debate. Every agent defaults to enabled;
/// the moderator has no toggle since it always runs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AgentToggles {
    #[serde(default = "default_true")]
    pub quantitative: bool,
    #[serde(default = "default_true")]
    pub time_decay: bool,
    #[serde(default = "default_true")]
    pub trader_flow: bool,
    #[serde(default = "default_true")]
    pub news: bool,
    #[serde(default = "default_true")]
    pub macro_analyst: bool,
    #[serde(default = "default_true")]
    pub contrarian: bool,
}

impl Default for AgentToggles {
    fn default() -> Self {
        Self {
            quantitative: true,
            time_decay: true,
            trader_flow: true,
            news: true,
            macro_analyst: true,
            contrarian: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let path = shellexpand::tilde(path).to_string();

        let cfg = config::Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("DEBATE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("building config")?;

        let config: Config = cfg.try_deserialize().context("deserializing config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.polymarket.gamma_url.is_empty(),
            "polymarket.gamma_url missing"
        );
        anyhow::ensure!(
            !self.polymarket.clob_url.is_empty(),
            "polymarket.clob_url missing"
        );
        anyhow::ensure!(self.flow.concurrency > 0, "flow.concurrency must be > 0");
        anyhow::ensure!(self.flow.top_n > 0, "flow.top_n must be > 0");
        // Ollama runs locally without a key; hosted providers need one.
        if self.llm.provider.to_lowercase() != "ollama" {
            anyhow::ensure!(
                !self.llm.api_key.is_empty(),
                "llm.api_key missing (set DEBATE__LLM__API_KEY)"
            );
        }
        Ok(())
    }
}
