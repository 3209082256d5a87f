//! Core market and trader types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A point-in-time view of one market, immutable for the length of a debate.
///
/// Prices are on the 0-100 scale throughout the crate; the CLOB delivers
/// [0,1] and the clients scale on ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub slug: Option<String>,
    pub question: String,
    /// Current YES price, 0-100
    pub yes_price: f64,
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub liquidity: f64,
    /// Resolution date as delivered by the API; parsed lazily by the
    /// time-decay toolkit since formats vary.
    pub end_date: Option<String>,
}

/// Trade side as reported by the Data API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse the raw API string ("BUY"/"SELL", any case). Anything else is
    /// a non-trade row (merges, rewards) and is skipped upstream.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// One raw fill from the trades feed. Timestamp stays raw JSON because the
/// API mixes epoch seconds, epoch millis and ISO strings.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    pub address: String,
    pub name: Option<String>,
    pub side: String,
    pub outcome: String,
    pub size: Decimal,
    pub price: Decimal,
    /// Explicit notional, when the feed provides one; else size * price.
    pub value: Option<Decimal>,
    pub timestamp: serde_json::Value,
    pub slug: Option<String>,
}

/// Net directional read on a wallet's activity in one market.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraderBias {
    Bullish,
    Bearish,
    Mixed,
}

impl TraderBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraderBias::Bullish => "bullish",
            TraderBias::Bearish => "bearish",
            TraderBias::Mixed => "mixed",
        }
    }
}

/// Classify a wallet's bias from its bullish/bearish notional volume.
///
/// The 1.1x dominance threshold is a fixed boundary: 111/100 is bullish,
/// 110/100 is still mixed.
pub fn classify_bias(bullish_volume: Decimal, bearish_volume: Decimal) -> TraderBias {
    if bullish_volume > bearish_volume * dec!(1.1) {
        TraderBias::Bullish
    } else if bearish_volume > bullish_volume * dec!(1.1) {
        TraderBias::Bearish
    } else {
        TraderBias::Mixed
    }
}

/// Aggregated per-wallet activity, one entry per unique address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderSnapshot {
    pub address: String,
    pub name: Option<String>,
    pub total_volume: Decimal,
    pub trade_count: usize,
    pub bullish_volume: Decimal,
    pub bearish_volume: Decimal,
    pub bias: TraderBias,
    pub last_active: DateTime<Utc>,
    /// Global account stats, filled by enrichment; zero when unavailable.
    pub global_pnl: Decimal,
    pub global_roi: f64,
    pub balance: Decimal,
}

impl TraderSnapshot {
    /// Short display handle: profile name when known, else a truncated
    /// wallet address.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(n) if !n.is_empty() => n.clone(),
            _ => {
                if self.address.len() > 10 {
                    format!("{}…{}", &self.address[..6], &self.address[self.address.len() - 4..])
                } else {
                    self.address.clone()
                }
            }
        }
    }
}
