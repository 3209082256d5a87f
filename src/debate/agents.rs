//! Analyst agents
//!
//! Each agent computes whatever figures it owns, formats a prompt from
//! those figures plus the transcript so far, and lets the LLM write the
//! argument. Errors propagate to the executor, which converts them into
//! degraded contributions.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Result;
use crate::llm::CompletionClient;
use crate::quant::{self, TimeDecay};
use crate::search::SearchProvider;

use super::{Agent, AgentId, Contribution, DebateState};

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Statistical analysis with actual calculation tools: implied probability,
/// volatility, momentum, support/resistance, EV scenarios and a
/// momentum-adjusted Kelly sizing, synthesized by the LLM.
pub struct QuantAgent {
    llm: Arc<dyn CompletionClient>,
}

impl QuantAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Probability adjustment implied by the trend label, in points.
    fn momentum_adjustment(trend: &str) -> f64 {
        if trend.starts_with("Strong Bullish") {
            5.0
        } else if trend.starts_with("Strong Bearish") {
            -5.0
        } else if trend.starts_with("Bullish") {
            2.0
        } else if trend.starts_with("Bearish") {
            -2.0
        } else {
            0.0
        }
    }

    fn build_report(state: &DebateState) -> String {
        let m = &state.market;
        let series = state.analysis_series();

        let implied = quant::implied_probability(m.yes_price);
        let vol = quant::volatility(series);
        let mom = quant::momentum(series);
        let levels = quant::support_resistance(series);

        let ev_bullish = quant::expected_value(m.yes_price, (m.yes_price + 10.0).min(95.0));
        let ev_bearish = quant::expected_value(m.yes_price, (m.yes_price - 10.0).max(5.0));

        let adjusted_prob =
            (m.yes_price + Self::momentum_adjustment(&mom.trend)).clamp(5.0, 95.0);
        let kelly = quant::kelly_criterion(m.yes_price, adjusted_prob);

        let fmt_opt = |v: Option<f64>| {
            v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "N/A".to_string())
        };

        format!(
            "## Quantitative Analysis Report\n\
             \n\
             ### Market Overview\n\
             - **Current Price**: {price:.1}%\n\
             - **24h Volume**: ${vol24:.0}\n\
             - **7d Volume**: ${vol7:.0}\n\
             - **Liquidity**: ${liq:.0}\n\
             - **End Date**: {end}\n\
             \n\
             ### Implied Probability\n\
             - Market implies **{iyes:.1}%** chance of YES\n\
             - Breakeven: need {byes:.1}%+ true probability for a YES bet to be +EV\n\
             \n\
             ### Price Volatility ({regime})\n\
             - Standard Deviation: {std:.2}%\n\
             - Price Range: {low:.1}% - {high:.1}% (Δ{range:.1}%)\n\
             - Coefficient of Variation: {cv:.1}%\n\
             \n\
             ### Momentum Analysis\n\
             - **Trend**: {trend}\n\
             - Current: {cur:.1}% | Short SMA: {sshort} | Long SMA: {slong}\n\
             - Rate of Change: {roc:.1}%\n\
             \n\
             ### Support & Resistance\n\
             - **Support**: {sup}% | **Resistance**: {res}%\n\
             - **Position**: {pos}\n\
             \n\
             ### Expected Value Scenarios\n\
             - If the market is efficient (true prob = {price:.0}%): EV = 0%\n\
             - If bullish edge (+10%): YES EV = {bull_ev:.1}%, {bull_rec}\n\
             - If bearish edge (-10%): NO EV = {bear_ev:.1}%, {bear_rec}\n\
             \n\
             ### Kelly Criterion (Momentum-Adjusted)\n\
             - Adjusted probability estimate: {adj:.1}%\n\
             - **Optimal Side**: {side}\n\
             - Quarter Kelly (conservative): {qk:.1}% of bankroll\n\
             - Half Kelly (moderate): {hk:.1}% of bankroll\n\
             - {krec}",
            price = m.yes_price,
            vol24 = m.volume_24h,
            vol7 = m.volume_7d,
            liq = m.liquidity,
            end = m.end_date.as_deref().unwrap_or("Unknown"),
            iyes = implied.implied_yes,
            byes = implied.breakeven_yes,
            regime = vol.regime,
            std = vol.std_dev,
            low = vol.low,
            high = vol.high,
            range = vol.range,
            cv = vol.coefficient_of_variation,
            trend = mom.trend,
            cur = mom.current,
            sshort = fmt_opt(mom.sma_short),
            slong = fmt_opt(mom.sma_long),
            roc = mom.rate_of_change,
            sup = fmt_opt(levels.support),
            res = fmt_opt(levels.resistance),
            pos = levels.position,
            bull_ev = ev_bullish.yes_ev,
            bull_rec = ev_bullish.recommendation,
            bear_ev = ev_bearish.no_ev,
            bear_rec = ev_bearish.recommendation,
            adj = adjusted_prob,
            side = kelly.side.as_str(),
            qk = kelly.quarter_kelly,
            hk = kelly.half_kelly,
            krec = kelly.recommendation,
        )
    }
}

#[async_trait]
impl Agent for QuantAgent {
    fn id(&self) -> AgentId {
        AgentId::Quantitative
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let report = Self::build_report(state);

        let prompt = format!(
            "You are a Statistics Expert for prediction markets.\n\
             Today's date is: {}\n\
             \n\
             Market Question: \"{}\"\n\
             \n\
             I have computed the following quantitative analysis:\n\
             \n\
             {}\n\
             \n\
             Based on these calculations:\n\
             1. Is the market efficiently priced or is there an edge?\n\
             2. What do momentum and volatility suggest about near-term price action?\n\
             3. Given the support/resistance levels, where are the key entry/exit points?\n\
             4. Final recommendation: BUY YES, BUY NO, or AVOID?\n\
             \n\
             Be specific and reference the calculated numbers.",
            today(),
            state.market.question,
            report
        );

        let interpretation = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: format!("{report}\n\n---\n\n### Expert Interpretation\n\n{interpretation}"),
        })
    }
}

/// Resolution-timing analysis built on the time-decay toolkit.
pub struct TimeDecayAgent {
    llm: Arc<dyn CompletionClient>,
}

impl TimeDecayAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    fn render_profile(state: &DebateState) -> String {
        let m = &state.market;
        match quant::time_decay(m.end_date.as_deref(), m.yes_price, Utc::now()) {
            TimeDecay::Unknown { reason } => {
                format!("Resolution timing unknown ({reason}); no urgency can be assigned.")
            }
            TimeDecay::Expired => {
                "The resolution date has already passed; the market is awaiting settlement."
                    .to_string()
            }
            TimeDecay::Active(p) => format!(
                "- Time remaining: {:.1} days ({:.0} hours)\n\
                 - Urgency: {}\n\
                 - Theta (decay factor): {:.2}\n\
                 - Volatility risk: {:.2} ({})\n\
                 - Read: {}",
                p.days_remaining,
                p.hours_remaining,
                p.urgency.as_str(),
                p.theta,
                p.volatility_risk,
                p.risk_label,
                p.advice
            ),
        }
    }
}

#[async_trait]
impl Agent for TimeDecayAgent {
    fn id(&self) -> AgentId {
        AgentId::TimeDecay
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let profile = Self::render_profile(state);

        let prompt = format!(
            "You are a Time Decay & Resolution Analyst for prediction markets.\n\
             Today's date is: {}\n\
             \n\
             Market: \"{}\" (currently priced at {:.1}% YES)\n\
             \n\
             Timing profile:\n\
             {}\n\
             \n\
             Analyze how the remaining time shapes this market: does the current\n\
             price leave room for the event to play out, who is the clock working\n\
             against, and how should urgency affect position sizing and timing?",
            today(),
            state.market.question,
            state.market.yes_price,
            profile
        );

        let analysis = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: format!("### Timing Profile\n\n{profile}\n\n{analysis}"),
        })
    }
}

/// Smart-money read over the aggregated trader snapshots.
pub struct TraderFlowAgent {
    llm: Arc<dyn CompletionClient>,
}

impl TraderFlowAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    fn render_table(state: &DebateState) -> String {
        state
            .traders
            .iter()
            .map(|t| {
                format!(
                    "- {} | bias: {} | volume: ${} across {} trades (bullish ${} / bearish ${}) | global PnL: ${} (ROI {:.1}%)",
                    t.display_name(),
                    t.bias.as_str(),
                    t.total_volume.round_dp(0),
                    t.trade_count,
                    t.bullish_volume.round_dp(0),
                    t.bearish_volume.round_dp(0),
                    t.global_pnl.round_dp(0),
                    t.global_roi,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Agent for TraderFlowAgent {
    fn id(&self) -> AgentId {
        AgentId::TraderFlow
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        if state.traders.is_empty() {
            return Ok(Contribution {
                agent: self.id(),
                content: "No notable trader activity found for this market in the \
                          lookback window."
                    .to_string(),
            });
        }

        let table = Self::render_table(state);

        let prompt = format!(
            "You are a Trader Flow Analyst for prediction markets.\n\
             Today's date is: {}\n\
             \n\
             Market: \"{}\"\n\
             \n\
             The most notable wallets active in this market:\n\
             {}\n\
             \n\
             What is the smart money doing? Weigh each wallet's bias by its size\n\
             and track record (global PnL/ROI), note any divergence between large\n\
             and small actors, and state whether the flow supports YES or NO.",
            today(),
            state.market.question,
            table
        );

        let analysis = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: format!("### Notable Wallets\n\n{table}\n\n{analysis}"),
        })
    }
}

/// News researcher: brainstorms queries, searches, analyzes the findings.
pub struct NewsAgent {
    llm: Arc<dyn CompletionClient>,
    search: Arc<dyn SearchProvider>,
}

impl NewsAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, search: Arc<dyn SearchProvider>) -> Self {
        Self { llm, search }
    }

    async fn brainstorm_queries(&self, question: &str) -> Vec<String> {
        let prompt = format!(
            "You are a smart News Researcher.\n\
             Today's date is: {}\n\
             \n\
             To answer this prediction market: \"{question}\"\n\
             Generate 3 distinct search queries to find the most relevant and\n\
             up-to-date information.\n\
             \n\
             1. Query 1: The exact market terms.\n\
             2. Query 2: Related entities, specific locations, or people involved.\n\
             3. Query 3: Broader context or recent breaking news affecting this topic.\n\
             \n\
             Output ONLY the 3 queries, one per line.",
            today()
        );

        match self.llm.complete(&prompt).await {
            Ok(text) => {
                let queries: Vec<String> = text
                    .lines()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .take(3)
                    .collect();
                if queries.is_empty() {
                    vec![format!("latest news {question}")]
                } else {
                    queries
                }
            }
            Err(e) => {
                tracing::warn!("Query brainstorm failed, falling back to default: {}", e);
                vec![format!("latest news {question}")]
            }
        }
    }
}

#[async_trait]
impl Agent for NewsAgent {
    fn id(&self) -> AgentId {
        AgentId::News
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let question = &state.market.question;
        let queries = self.brainstorm_queries(question).await;
        tracing::info!("Generated search queries: {:?}", queries);

        let mut results = Vec::new();
        for q in &queries {
            match self.search.search(q).await {
                Ok(snippets) => results.extend(snippets),
                Err(e) => tracing::warn!("Search failed for query '{}': {}", q, e),
            }
        }

        // Dedup by stringified content, first occurrence wins
        let mut seen = HashSet::new();
        let unique: Vec<String> = results
            .into_iter()
            .filter(|r| seen.insert(r.clone()))
            .take(5)
            .collect();

        let search_context = if unique.is_empty() {
            "No relevant search results found.".to_string()
        } else {
            unique.join("\n\n")
        };

        let prompt = format!(
            "You are a News Analyst.\n\
             Today's date is: {}\n\
             \n\
             Your goal is to find the latest real-world events that impact this\n\
             market: \"{question}\"\n\
             \n\
             You performed these searches: {queries:?}\n\
             \n\
             Search Results:\n\
             {search_context}\n\
             \n\
             Analyze how these recent news stories affect the likelihood of the\n\
             event resolving YES or NO. Cite specific articles or events found.",
            today()
        );

        let analysis = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: analysis,
        })
    }
}

/// Structural / macro / crypto-correlation perspective. No tools.
pub struct MacroAgent {
    llm: Arc<dyn CompletionClient>,
}

impl MacroAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for MacroAgent {
    fn id(&self) -> AgentId {
        AgentId::Macro
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let prompt = format!(
            "You are a Crypto and Macroeconomics Analyst.\n\
             Today's date is: {}\n\
             \n\
             Analyze the market \"{}\" from a structural, macro, or crypto-native\n\
             perspective.\n\
             \n\
             Does general market sentiment, crypto correlation, or macro events\n\
             (Fed rates, elections, etc.) impact this?",
            today(),
            state.market.question
        );

        let analysis = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: analysis,
        })
    }
}

/// Challenges everything said before it; runs last among the analysts.
pub struct ContrarianAgent {
    llm: Arc<dyn CompletionClient>,
}

impl ContrarianAgent {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for ContrarianAgent {
    fn id(&self) -> AgentId {
        AgentId::Contrarian
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let context = if state.transcript.is_empty() {
            "No previous arguments provided.".to_string()
        } else {
            state.transcript_text()
        };

        let prompt = format!(
            "You are the Devil's Advocate.\n\
             Today's date is: {}\n\
             \n\
             Your job is to challenge the consensus and find logical fallacies in\n\
             the arguments presented so far.\n\
             \n\
             Market: \"{}\"\n\
             Previous Arguments:\n\
             {}\n\
             \n\
             Identify risks, alternative interpretations, or missing data points.\n\
             If everyone says YES, argue why NO might happen, and vice versa.",
            today(),
            state.market.question,
            context
        );

        let analysis = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: analysis,
        })
    }
}
