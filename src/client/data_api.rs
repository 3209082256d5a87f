//! Data API client for trades, holders and wallet positions

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::Result;
use crate::flow::{GlobalStats, HolderRecord, TraderStatsProvider};
use crate::types::TradeRecord;

/// Data API client. Every method degrades to an empty result on a non-200
/// response; the feed being down should not kill a debate.
#[derive(Clone)]
pub struct DataApiClient {
    http: Client,
    base_url: String,
}

impl DataApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Recent raw fills for a market slug.
    pub async fn trades(&self, market_slug: &str, limit: usize) -> Result<Vec<TradeRecord>> {
        let url = format!("{}/trades", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("market", market_slug), ("limit", &limit.to_string())])
            .send()
            .await?;

        if !resp.status().is_success() {
            tracing::warn!("Trades feed returned status {}", resp.status());
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = resp.json().await?;
        Ok(rows.iter().filter_map(parse_trade).collect())
    }

    /// Current top holders for a market, ranked by position size. The
    /// response carries one entry per outcome token; outcome index 0 is YES.
    pub async fn holders(&self, condition_id: &str) -> Result<Vec<HolderRecord>> {
        let url = format!("{}/holders", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("market", condition_id)])
            .send()
            .await?;

        if !resp.status().is_success() {
            tracing::warn!("Holders feed returned status {}", resp.status());
            return Ok(Vec::new());
        }

        let tokens: Vec<Value> = resp.json().await?;
        let mut holders = Vec::new();

        for (token_idx, token) in tokens.iter().enumerate() {
            let rows = match token.get("holders").and_then(|v| v.as_array()) {
                Some(rows) => rows,
                None => continue,
            };
            for row in rows {
                let address = match row.get("proxyWallet").and_then(|v| v.as_str()) {
                    Some(a) if !a.is_empty() => a.to_string(),
                    _ => continue,
                };
                let outcome_index = row
                    .get("outcomeIndex")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(token_idx as u64);

                holders.push(HolderRecord {
                    address,
                    name: display_name(row),
                    amount: decimal_field(row, "amount").unwrap_or(Decimal::ZERO),
                    is_yes: outcome_index == 0,
                });
            }
        }

        holders.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(holders)
    }
}

#[async_trait]
impl TraderStatsProvider for DataApiClient {
    /// Account-wide stats from the positions endpoint: PnL is the sum of
    /// per-position cash PnL, cost basis the sum of initial values, ROI
    /// their ratio, balance the sum of current values.
    async fn global_stats(&self, address: &str) -> Result<GlobalStats> {
        let url = format!("{}/positions", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("user", address), ("limit", "500")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Ok(GlobalStats::default());
        }

        let positions: Vec<Value> = resp.json().await?;

        let mut pnl = Decimal::ZERO;
        let mut cost_basis = Decimal::ZERO;
        let mut balance = Decimal::ZERO;

        for p in &positions {
            pnl += decimal_field(p, "cashPnl").unwrap_or(Decimal::ZERO);
            balance += decimal_field(p, "currentValue").unwrap_or(Decimal::ZERO);
            if let Some(initial) = decimal_field(p, "initialValue") {
                if initial > Decimal::ZERO {
                    cost_basis += initial;
                }
            }
        }

        let roi = if cost_basis > Decimal::ZERO {
            (pnl / cost_basis * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        Ok(GlobalStats { pnl, roi, balance })
    }
}

fn parse_trade(row: &Value) -> Option<TradeRecord> {
    let address = row.get("proxyWallet").and_then(|v| v.as_str())?;

    Some(TradeRecord {
        address: address.to_string(),
        name: display_name(row),
        side: row
            .get("side")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        outcome: row
            .get("outcome")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        size: decimal_field(row, "size")?,
        price: decimal_field(row, "price")?,
        value: decimal_field(row, "value"),
        timestamp: row.get("timestamp").cloned().unwrap_or(Value::Null),
        slug: row
            .get("slug")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    })
}

fn display_name(row: &Value) -> Option<String> {
    row.get("name")
        .or_else(|| row.get("pseudonym"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Numeric field that may arrive as a number or a numeric string.
fn decimal_field(row: &Value, key: &str) -> Option<Decimal> {
    match row.get(key)? {
        Value::Number(n) => Decimal::try_from(n.as_f64()?).ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
