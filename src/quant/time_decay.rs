//! Time-decay and resolution-urgency analysis

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::round2;

/// Resolution-timing read on a market.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeDecay {
    /// End date missing or unparsable
    Unknown { reason: String },
    /// Resolution date already passed
    Expired,
    Active(TimeDecayProfile),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Critical,
    High,
    Moderate,
    Low,
    Minimal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "CRITICAL",
            Urgency::High => "HIGH",
            Urgency::Moderate => "MODERATE",
            Urgency::Low => "LOW",
            Urgency::Minimal => "MINIMAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeDecayProfile {
    pub days_remaining: f64,
    pub hours_remaining: f64,
    pub urgency: Urgency,
    /// Heuristic decay factor, 1/sqrt(days); grows as resolution nears
    pub theta: f64,
    /// Price uncertainty x time pressure, both in [0,1]
    pub volatility_risk: f64,
    pub risk_label: &'static str,
    pub advice: &'static str,
}

/// Parse the resolution date. The APIs mix RFC 3339, bare ISO datetimes and
/// plain dates, so several formats are tried in order.
fn parse_end_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Time-decay profile for a market resolving at `end_date`, priced at
/// `yes_price` (0-100), evaluated at `now`.
pub fn time_decay(end_date: Option<&str>, yes_price: f64, now: DateTime<Utc>) -> TimeDecay {
    let raw = match end_date {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return TimeDecay::Unknown {
                reason: "no resolution date".to_string(),
            }
        }
    };

    let end = match parse_end_date(raw) {
        Some(dt) => dt,
        None => {
            return TimeDecay::Unknown {
                reason: format!("unparsable resolution date: {raw}"),
            }
        }
    };

    let secs = (end - now).num_seconds();
    if secs < 0 {
        return TimeDecay::Expired;
    }

    let days = secs as f64 / 86_400.0;
    let hours = secs as f64 / 3_600.0;

    let urgency = if days <= 1.0 {
        Urgency::Critical
    } else if days <= 3.0 {
        Urgency::High
    } else if days <= 7.0 {
        Urgency::Moderate
    } else if days <= 30.0 {
        Urgency::Low
    } else {
        Urgency::Minimal
    };

    let theta = 1.0 / days.max(0.1).sqrt();

    let price_uncertainty = (1.0 - (yes_price - 50.0).abs() / 50.0).max(0.0);
    let time_pressure = (7.0 / days.max(0.1)).min(1.0);
    let volatility_risk = price_uncertainty * time_pressure;

    let risk_label = if volatility_risk > 0.7 {
        "high"
    } else if volatility_risk > 0.4 {
        "moderate"
    } else {
        "low"
    };

    TimeDecay::Active(TimeDecayProfile {
        days_remaining: round2(days),
        hours_remaining: round2(hours),
        urgency,
        theta: round2(theta),
        volatility_risk: round2(volatility_risk),
        risk_label,
        advice: strategic_advice(yes_price, days),
    })
}

/// Fixed advice table keyed on how extreme the price is and how close
/// resolution sits.
fn strategic_advice(yes_price: f64, days: f64) -> &'static str {
    let extremity = (yes_price - 50.0).abs() / 50.0;

    match (extremity, days) {
        (e, d) if e >= 0.7 && d <= 3.0 => {
            "Near-certain pricing with resolution imminent; the residual edge rarely covers the downside"
        }
        (e, d) if e >= 0.7 && d <= 14.0 => {
            "Priced close to certain well ahead of resolution; fading consensus needs hard contrary evidence"
        }
        (e, _) if e >= 0.7 => {
            "Early consensus at an extreme price; the long shot is cheap optionality if new information is plausible"
        }
        (e, d) if e >= 0.3 && d <= 3.0 => {
            "A lean, not a lock, with the clock almost out; late news will reprice this violently"
        }
        (e, d) if e >= 0.3 && d <= 14.0 => {
            "Directional lean with time left; watch whether momentum hardens it into consensus"
        }
        (e, _) if e >= 0.3 => {
            "Mild lean far from resolution; theta is negligible and patience is cheap"
        }
        (_, d) if d <= 3.0 => {
            "Coin-flip pricing into resolution; expect whipsaw and size accordingly"
        }
        (_, d) if d <= 14.0 => {
            "No consensus yet and the window is closing; an informational edge is worth the most right here"
        }
        _ => "Wide-open market with plenty of runway; early positioning is cheap but capital sits idle",
    }
}
