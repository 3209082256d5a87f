//! Quantitative toolkit for binary prediction markets
//!
//! Pure functions over 0-100 scale prices. Nothing here performs I/O and
//! nothing returns an error: degenerate input (empty series, zero prices)
//! resolves to explicit sentinel values so the calling agents always have
//! something to report.

mod time_decay;


pub use time_decay::{time_decay, TimeDecay, TimeDecayProfile, Urgency};

/// Round to 2 decimals, matching the precision used in agent reports.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Expected value of a 1-unit bet on each side, as percentage returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedValue {
    pub yes_ev: f64,
    pub no_ev: f64,
    /// Absolute gap between market price and the estimate, in points
    pub edge: f64,
    pub recommendation: String,
}

/// EV for YES and NO bets given the market price and an estimated
/// probability (both 0-100).
///
/// A winning YES bet at price p pays (1-p)/p per unit staked; the loss is
/// the full stake. NO is symmetric at price (1-p).
pub fn expected_value(yes_price: f64, estimated_prob: f64) -> ExpectedValue {
    let price = yes_price / 100.0;
    let prob = estimated_prob / 100.0;

    let yes_profit = if price > 0.0 { (1.0 - price) / price } else { 0.0 };
    let yes_ev = prob * yes_profit - (1.0 - prob);

    let no_price = 1.0 - price;
    let no_profit = if no_price > 0.0 { (1.0 - no_price) / no_price } else { 0.0 };
    let no_ev = (1.0 - prob) * no_profit - prob;

    let recommendation = if yes_ev > 0.05 {
        "BUY YES (+EV)".to_string()
    } else if no_ev > 0.05 {
        "BUY NO (+EV)".to_string()
    } else if yes_ev > 0.0 {
        "Slight YES edge".to_string()
    } else if no_ev > 0.0 {
        "Slight NO edge".to_string()
    } else {
        "Market is fairly priced".to_string()
    };

    ExpectedValue {
        yes_ev: round2(yes_ev * 100.0),
        no_ev: round2(no_ev * 100.0),
        edge: round2((yes_price - estimated_prob).abs()),
        recommendation,
    }
}

/// Market-implied probabilities and the overround.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpliedProbability {
    pub implied_yes: f64,
    pub implied_no: f64,
    /// Overround in points; ~0 on venues without a fee baked into prices
    pub vig: f64,
    /// True probability needed to break even on each side (= the price)
    pub breakeven_yes: f64,
    pub breakeven_no: f64,
}

pub fn implied_probability(yes_price: f64) -> ImpliedProbability {
    let yes_prob = yes_price / 100.0;
    let no_prob = (100.0 - yes_price) / 100.0;
    let vig = (yes_prob + no_prob - 1.0) * 100.0;

    ImpliedProbability {
        implied_yes: round2(yes_price),
        implied_no: round2(100.0 - yes_price),
        vig: round3(vig),
        breakeven_yes: round2(yes_price),
        breakeven_no: round2(100.0 - yes_price),
    }
}

/// Side the Kelly fraction favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetSide {
    Yes,
    No,
    None,
}

impl BetSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetSide::Yes => "YES",
            BetSide::No => "NO",
            BetSide::None => "NONE",
        }
    }
}

/// Kelly bankroll fractions, expressed as percentages of bankroll.
#[derive(Debug, Clone, PartialEq)]
pub struct KellySizing {
    pub full_kelly: f64,
    pub half_kelly: f64,
    pub quarter_kelly: f64,
    pub side: BetSide,
    pub recommendation: String,
}

/// Kelly criterion per side: f* = (b*p - q) / b with b the payoff odds for
/// that side. Picks the larger positive fraction, clamped to [0,1];
/// `BetSide::None` when neither side has an edge.
pub fn kelly_criterion(yes_price: f64, estimated_prob: f64) -> KellySizing {
    let price = yes_price / 100.0;
    let prob = estimated_prob / 100.0;

    let kelly_yes = if price > 0.0 && price < 1.0 {
        let b = (1.0 - price) / price;
        (b * prob - (1.0 - prob)) / b
    } else {
        0.0
    };

    let no_price = 1.0 - price;
    let kelly_no = if no_price > 0.0 && no_price < 1.0 {
        let b = (1.0 - no_price) / no_price;
        (b * (1.0 - prob) - prob) / b
    } else {
        0.0
    };

    let (fraction, side) = if kelly_yes > kelly_no && kelly_yes > 0.0 {
        (kelly_yes, BetSide::Yes)
    } else if kelly_no > 0.0 {
        (kelly_no, BetSide::No)
    } else {
        (0.0, BetSide::None)
    };

    let fraction = fraction.clamp(0.0, 1.0);

    let recommendation = if fraction > 0.01 {
        format!(
            "Bet {:.1}%-{:.1}% of bankroll on {}",
            fraction * 25.0,
            fraction * 50.0,
            side.as_str()
        )
    } else {
        "No bet recommended (no edge)".to_string()
    };

    KellySizing {
        full_kelly: round2(fraction * 100.0),
        half_kelly: round2(fraction * 50.0),
        quarter_kelly: round2(fraction * 25.0),
        side,
        recommendation,
    }
}

/// Dispersion metrics over a price series.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityProfile {
    pub std_dev: f64,
    pub mean: f64,
    pub coefficient_of_variation: f64,
    pub regime: String,
    pub range: f64,
    pub high: f64,
    pub low: f64,
}

/// Population std-dev over the series plus a regime label. Needs at least
/// 2 points; below that the sentinel (std 0, mean 50) is returned.
pub fn volatility(prices: &[f64]) -> VolatilityProfile {
    if prices.len() < 2 {
        return VolatilityProfile {
            std_dev: 0.0,
            mean: 50.0,
            coefficient_of_variation: 0.0,
            regime: "Unknown (insufficient data)".to_string(),
            range: 0.0,
            high: 0.0,
            low: 0.0,
        };
    }

    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let cv = if mean > 0.0 { std_dev / mean * 100.0 } else { 0.0 };
    let high = prices.iter().cloned().fold(f64::MIN, f64::max);
    let low = prices.iter().cloned().fold(f64::MAX, f64::min);

    let regime = if std_dev < 2.0 {
        "Low volatility (stable)"
    } else if std_dev < 5.0 {
        "Moderate volatility"
    } else if std_dev < 10.0 {
        "High volatility"
    } else {
        "Extreme volatility"
    };

    VolatilityProfile {
        std_dev: round2(std_dev),
        mean: round2(mean),
        coefficient_of_variation: round2(cv),
        regime: regime.to_string(),
        range: round2(high - low),
        high: round2(high),
        low: round2(low),
    }
}

/// Moving-average and rate-of-change snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumSnapshot {
    pub current: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema: Option<f64>,
    pub rate_of_change: f64,
    pub trend: String,
}

/// SMA/EMA trend read. Short SMA window is the most recent quarter of the
/// series (min 3 points), long SMA is the full-series mean, EMA window is
/// min(10, len) seeded at the first in-window price. Needs at least 3
/// points, otherwise a sentinel with trend "Insufficient data".
pub fn momentum(prices: &[f64]) -> MomentumSnapshot {
    if prices.len() < 3 {
        return MomentumSnapshot {
            current: prices.last().copied().unwrap_or(0.0),
            sma_short: None,
            sma_long: None,
            ema: None,
            rate_of_change: 0.0,
            trend: "Insufficient data".to_string(),
        };
    }

    let len = prices.len();
    let current = prices[len - 1];

    let short_period = (len / 4).max(3);
    let sma_short = prices[len - short_period..].iter().sum::<f64>() / short_period as f64;
    let sma_long = prices.iter().sum::<f64>() / len as f64;

    let ema_period = len.min(10);
    let alpha = 2.0 / (ema_period as f64 + 1.0);
    let window = &prices[len - ema_period..];
    let mut ema = window[0];
    for p in &window[1..] {
        ema = alpha * p + (1.0 - alpha) * ema;
    }

    let trend = if current > sma_short && sma_short > sma_long {
        "Strong Bullish (price > short SMA > long SMA)"
    } else if current > sma_short {
        "Bullish (price above short-term average)"
    } else if current < sma_short && sma_short < sma_long {
        "Strong Bearish (price < short SMA < long SMA)"
    } else if current < sma_short {
        "Bearish (price below short-term average)"
    } else {
        "Neutral (consolidating)"
    };

    let rate_of_change = if len >= 5 {
        let base = prices[len - 5];
        if base > 0.0 {
            (current - base) / base * 100.0
        } else {
            0.0
        }
    } else {
        0.0
    };

    MomentumSnapshot {
        current: round2(current),
        sma_short: Some(round2(sma_short)),
        sma_long: Some(round2(sma_long)),
        ema: Some(round2(ema)),
        rate_of_change: round2(rate_of_change),
        trend: trend.to_string(),
    }
}

/// Percentile-based support/resistance levels.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub period_low: f64,
    pub period_high: f64,
    pub position: String,
}

/// Support at the 20th percentile of the sorted series, resistance at the
/// 80th (index = floor(n * pct), a fixed boundary). Needs at least 5 points.
pub fn support_resistance(prices: &[f64]) -> PriceLevels {
    if prices.len() < 5 {
        return PriceLevels {
            support: None,
            resistance: None,
            period_low: 0.0,
            period_high: 0.0,
            position: "Insufficient data".to_string(),
        };
    }

    let current = prices[prices.len() - 1];
    let mut sorted: Vec<f64> = prices.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let support = sorted[(n as f64 * 0.2) as usize];
    let resistance = sorted[(n as f64 * 0.8) as usize];

    let range_size = if resistance > support { resistance - support } else { 1.0 };
    let position_pct = (current - support) / range_size * 100.0;

    let position = if current <= support * 1.02 {
        format!("At support ({support:.1}%) - potential bounce zone")
    } else if current >= resistance * 0.98 {
        format!("At resistance ({resistance:.1}%) - potential rejection zone")
    } else if position_pct > 70.0 {
        format!("Upper range ({position_pct:.0}%) - approaching resistance")
    } else if position_pct < 30.0 {
        format!("Lower range ({position_pct:.0}%) - approaching support")
    } else {
        format!("Mid-range ({position_pct:.0}%)")
    };

    PriceLevels {
        support: Some(round2(support)),
        resistance: Some(round2(resistance)),
        period_low: round2(sorted[0]),
        period_high: round2(sorted[n - 1]),
        position,
    }
}
