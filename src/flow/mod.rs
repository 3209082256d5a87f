//! Trader-flow aggregation
//!
//! Collapses raw wallet activity on one market into a ranked list of
//! notable actors. Two input shapes: a holders snapshot (preferred, already
//! ranked by position size) or a window of raw fills when holders are
//! unavailable. Either way the output is one `TraderSnapshot` per unique
//! address, ranked by notional volume, enriched with global account stats
//! through a bounded number of concurrent lookups.


use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::{stream, StreamExt};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::FlowConfig;
use crate::error::Result;
use crate::types::{classify_bias, Side, TradeRecord, TraderSnapshot};

/// Account-wide stats for one wallet, fetched during enrichment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalStats {
    pub pnl: Decimal,
    pub roi: f64,
    pub balance: Decimal,
}

/// External stats lookup, injected so tests can script failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TraderStatsProvider: Send + Sync {
    async fn global_stats(&self, address: &str) -> Result<GlobalStats>;
}

/// One row of the holders snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct HolderRecord {
    pub address: String,
    pub name: Option<String>,
    pub amount: Decimal,
    /// true when the wallet holds the YES outcome token
    pub is_yes: bool,
}

pub struct TraderFlowAggregator {
    cfg: FlowConfig,
}

/// Running per-wallet totals during the trade scan.
struct WalletAcc {
    name: Option<String>,
    total_volume: Decimal,
    trade_count: usize,
    bullish_volume: Decimal,
    bearish_volume: Decimal,
    last_active: DateTime<Utc>,
}

impl TraderFlowAggregator {
    pub fn new(cfg: FlowConfig) -> Self {
        Self { cfg }
    }

    /// Parse a trades-feed timestamp: epoch seconds, epoch millis, or an
    /// ISO string. Anything else is rejected and the fill is dropped.
    pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
        if let Some(n) = value.as_i64() {
            return epoch_to_datetime(n);
        }
        if let Some(f) = value.as_f64() {
            return epoch_to_datetime(f as i64);
        }
        if let Some(s) = value.as_str() {
            if let Ok(n) = s.parse::<i64>() {
                return epoch_to_datetime(n);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
        }
        None
    }

    /// Aggregate raw fills for `market_key` (slug or id, matched
    /// case-insensitively) into ranked snapshots.
    pub fn aggregate_trades(
        &self,
        market_key: &str,
        records: &[TradeRecord],
        now: DateTime<Utc>,
    ) -> Vec<TraderSnapshot> {
        let target = market_key.to_lowercase();
        let cutoff = now - Duration::days(self.cfg.lookback_days);
        let min_value = Decimal::try_from(self.cfg.min_trade_value).unwrap_or(Decimal::ZERO);

        let mut wallets: HashMap<String, WalletAcc> = HashMap::new();

        for record in records {
            // Feed rows for other markets slip in when querying by slug
            if let Some(slug) = &record.slug {
                if slug.to_lowercase() != target {
                    continue;
                }
            }

            let ts = match Self::parse_timestamp(&record.timestamp) {
                Some(ts) => ts,
                None => continue,
            };
            if ts < cutoff {
                continue;
            }

            let side = match Side::parse(&record.side) {
                Some(side) => side,
                None => continue,
            };

            let notional = record.value.unwrap_or(record.size * record.price);
            if notional < min_value {
                continue;
            }

            let bullish = is_bullish(side, &record.outcome);

            let acc = wallets
                .entry(record.address.clone())
                .or_insert_with(|| WalletAcc {
                    name: record.name.clone(),
                    total_volume: Decimal::ZERO,
                    trade_count: 0,
                    bullish_volume: Decimal::ZERO,
                    bearish_volume: Decimal::ZERO,
                    last_active: ts,
                });

            acc.total_volume += notional;
            acc.trade_count += 1;
            if bullish {
                acc.bullish_volume += notional;
            } else {
                acc.bearish_volume += notional;
            }
            if ts > acc.last_active {
                acc.last_active = ts;
            }
        }

        let mut snapshots: Vec<TraderSnapshot> = wallets
            .into_iter()
            .map(|(address, acc)| TraderSnapshot {
                address,
                name: acc.name,
                total_volume: acc.total_volume,
                trade_count: acc.trade_count,
                bullish_volume: acc.bullish_volume,
                bearish_volume: acc.bearish_volume,
                bias: classify_bias(acc.bullish_volume, acc.bearish_volume),
                last_active: acc.last_active,
                global_pnl: Decimal::ZERO,
                global_roi: 0.0,
                balance: Decimal::ZERO,
            })
            .collect();

        snapshots.sort_by(|a, b| b.total_volume.cmp(&a.total_volume));
        snapshots.truncate(self.cfg.top_n);
        snapshots
    }

    /// Fallback-free path: the holders snapshot is already ranked by
    /// position size, so this just reshapes and truncates.
    pub fn from_holders(&self, holders: &[HolderRecord], now: DateTime<Utc>) -> Vec<TraderSnapshot> {
        holders
            .iter()
            .take(self.cfg.top_n)
            .map(|h| {
                let (bullish, bearish) = if h.is_yes {
                    (h.amount, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, h.amount)
                };
                TraderSnapshot {
                    address: h.address.clone(),
                    name: h.name.clone(),
                    total_volume: h.amount,
                    trade_count: 0,
                    bullish_volume: bullish,
                    bearish_volume: bearish,
                    bias: classify_bias(bullish, bearish),
                    last_active: now,
                    global_pnl: Decimal::ZERO,
                    global_roi: 0.0,
                    balance: Decimal::ZERO,
                }
            })
            .collect()
    }

    /// Attach global stats to each snapshot. At most `cfg.concurrency`
    /// lookups run at once; results are gathered after the join and merged
    /// here, single-threaded. A failed lookup leaves that wallet's stats
    /// zeroed and never disturbs the ranking.
    pub async fn enrich(
        &self,
        mut snapshots: Vec<TraderSnapshot>,
        provider: &dyn TraderStatsProvider,
    ) -> Vec<TraderSnapshot> {
        let lookups = snapshots.iter().enumerate().map(|(i, snap)| {
            let address = snap.address.clone();
            async move { (i, provider.global_stats(&address).await) }
        });

        let results: Vec<(usize, Result<GlobalStats>)> = stream::iter(lookups)
            .buffer_unordered(self.cfg.concurrency)
            .collect()
            .await;

        for (i, result) in results {
            match result {
                Ok(stats) => {
                    let snap = &mut snapshots[i];
                    snap.global_pnl = stats.pnl;
                    snap.global_roi = stats.roi;
                    snap.balance = stats.balance;
                }
                Err(e) => {
                    tracing::debug!("Stats lookup failed for {}: {}", snapshots[i].address, e);
                }
            }
        }

        snapshots
    }
}

/// A fill is bullish when it bets on the positive outcome: buying
/// YES/UP or selling NO/DOWN. Everything else counts as bearish flow.
fn is_bullish(side: Side, outcome: &str) -> bool {
    let outcome = outcome.to_lowercase();
    let is_yes = outcome == "yes" || outcome == "up";
    let is_no = outcome == "no" || outcome == "down";
    match side {
        Side::Buy => is_yes,
        Side::Sell => is_no,
    }
}

fn epoch_to_datetime(n: i64) -> Option<DateTime<Utc>> {
    // Values past the year ~33658 in seconds are really milliseconds
    let secs = if n > 1_000_000_000_000 { n / 1000 } else { n };
    Utc.timestamp_opt(secs, 0).single()
}
