//! Gamma API client for market metadata

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DebateError, Result};
use crate::types::MarketSnapshot;

/// Gamma API client for market lookups.
#[derive(Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

/// A market snapshot plus the CLOB token ids needed for price history
/// (first token is the YES outcome).
#[derive(Debug, Clone)]
pub struct MarketData {
    pub snapshot: MarketSnapshot,
    pub clob_token_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GammaMarket {
    id: String,
    question: String,
    slug: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
    // Gamma mixes numbers and numeric strings across these fields
    #[serde(rename = "volume24hr", default)]
    volume_24hr: Option<Value>,
    #[serde(rename = "volume1wk", default)]
    volume_1wk: Option<Value>,
    #[serde(rename = "volumeNum", default)]
    volume_num: Option<Value>,
    #[serde(rename = "liquidityNum", default)]
    liquidity_num: Option<Value>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    archived: bool,
    #[serde(rename = "outcomePrices")]
    outcome_prices: Option<String>, // JSON string "[\"0.55\", \"0.45\"]"
    #[serde(rename = "clobTokenIds")]
    clob_token_ids: Option<String>, // JSON string
}

impl GammaClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look a market up by slug, falling back to direct id lookup.
    pub async fn market(&self, key: &str) -> Result<MarketData> {
        let url = format!("{}/markets", self.base_url);
        let by_slug: Vec<GammaMarket> = self
            .http
            .get(&url)
            .query(&[("slug", key)])
            .send()
            .await?
            .json()
            .await
            .unwrap_or_default();

        if let Some(gm) = by_slug.into_iter().next() {
            return Ok(parse_market(gm));
        }

        debug!("No slug match for {}, trying id lookup", key);
        let url = format!("{}/markets/{}", self.base_url, key);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(DebateError::MarketNotFound(key.to_string()));
        }
        let gm: GammaMarket = resp.json().await?;
        Ok(parse_market(gm))
    }

    /// Active markets ranked by weekly volume (24h volume breaks ties).
    pub async fn top_markets(&self, limit: usize) -> Result<Vec<MarketSnapshot>> {
        let url = format!("{}/markets", self.base_url);
        let resp: Vec<GammaMarket> = self
            .http
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("order", "volume24hr"),
                ("ascending", "false"),
                ("limit", &(limit * 2).to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let mut markets: Vec<MarketSnapshot> = resp
            .into_iter()
            .filter(|gm| gm.active && !gm.closed && !gm.archived)
            .map(|gm| parse_market(gm).snapshot)
            .collect();

        markets.sort_by(|a, b| {
            (b.volume_7d, b.volume_24h)
                .partial_cmp(&(a.volume_7d, a.volume_24h))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        markets.truncate(limit);
        Ok(markets)
    }
}

fn parse_market(gm: GammaMarket) -> MarketData {
    // First outcome price is the YES token; scale [0,1] -> 0-100
    let yes_price = gm
        .outcome_prices
        .as_ref()
        .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .and_then(|prices| prices.first().and_then(|p| p.parse::<f64>().ok()))
        .filter(|p| (0.0..=1.0).contains(p))
        .map(|p| p * 100.0)
        .unwrap_or(50.0);

    let clob_token_ids: Vec<String> = gm
        .clob_token_ids
        .as_ref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    let volume_num = as_f64(gm.volume_num.as_ref());
    let mut volume_24h = as_f64(gm.volume_24hr.as_ref());
    let mut volume_7d = as_f64(gm.volume_1wk.as_ref());

    // Specific windows are often missing on fresh markets; fall back to the
    // aggregate, then to each other
    if volume_24h == 0.0 {
        volume_24h = volume_num;
    }
    if volume_7d == 0.0 {
        volume_7d = volume_num;
    }
    if volume_7d == 0.0 && volume_24h > 0.0 {
        volume_7d = volume_24h;
    }

    MarketData {
        snapshot: MarketSnapshot {
            id: gm.id,
            slug: gm.slug,
            question: gm.question,
            yes_price: (yes_price * 100.0).round() / 100.0,
            volume_24h,
            volume_7d,
            liquidity: as_f64(gm.liquidity_num.as_ref()),
            end_date: gm.end_date,
        },
        clob_token_ids,
    }
}

/// Numeric field that may arrive as a number or a numeric string.
fn as_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
