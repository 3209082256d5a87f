//! CLOB API client for price history

use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;

/// CLOB price-history client.
#[derive(Clone)]
pub struct ClobClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct HistoryPoint {
    #[allow(dead_code)]
    t: i64,
    /// Price in [0,1]
    p: f64,
}

impl ClobClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Price history for a token, oldest first, scaled to 0-100.
    /// `fidelity` is the point spacing in minutes.
    pub async fn price_history(
        &self,
        token_id: &str,
        interval: &str,
        fidelity: u32,
    ) -> Result<Vec<f64>> {
        let url = format!("{}/prices-history", self.base_url);
        let resp: HistoryResponse = self
            .http
            .get(&url)
            .query(&[
                ("market", token_id),
                ("interval", interval),
                ("fidelity", &fidelity.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(resp.history.into_iter().map(|h| h.p * 100.0).collect())
    }

    /// 24h window at 15-minute fidelity.
    pub async fn history_24h(&self, token_id: &str) -> Result<Vec<f64>> {
        self.price_history(token_id, "1d", 15).await
    }

    /// 7d window at 1-hour fidelity.
    pub async fn history_7d(&self, token_id: &str) -> Result<Vec<f64>> {
        self.price_history(token_id, "7d", 60).await
    }
}
