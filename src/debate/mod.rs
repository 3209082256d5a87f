//! The debate floor
//!
//! A debate is an ordered sequence of analyst agents, each reading the whole
//! accumulated transcript and appending one contribution, closed out by the
//! moderator who always runs last and writes the verdict. Agents are fault
//! isolated: one failing (bad response, network, anything) produces a
//! visible degraded contribution and the debate moves on.

pub mod agents;
pub mod moderator;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AgentToggles;
use crate::error::{DebateError, Result};
use crate::llm::CompletionClient;
use crate::search::SearchProvider;
use crate::types::{MarketSnapshot, TraderSnapshot};

use agents::{ContrarianAgent, MacroAgent, NewsAgent, QuantAgent, TimeDecayAgent, TraderFlowAgent};
use moderator::Moderator;

/// Verdict used when the moderator itself fails; the caller always gets a
/// non-empty verdict string.
pub const FALLBACK_VERDICT: &str = "Verdict generation failed.";

/// Stable identifiers for every debate participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentId {
    Quantitative,
    TimeDecay,
    TraderFlow,
    News,
    Macro,
    Contrarian,
    Moderator,
}

impl AgentId {
    /// Speaking order for the analyst agents. The devil's advocate goes
    /// last so it has everything else to attack; the moderator is not
    /// listed because it is appended to every plan unconditionally.
    pub const CANONICAL_ORDER: [AgentId; 6] = [
        AgentId::Quantitative,
        AgentId::TimeDecay,
        AgentId::TraderFlow,
        AgentId::News,
        AgentId::Macro,
        AgentId::Contrarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Quantitative => "quantitative",
            AgentId::TimeDecay => "time-decay",
            AgentId::TraderFlow => "trader-flow",
            AgentId::News => "news",
            AgentId::Macro => "macro",
            AgentId::Contrarian => "contrarian",
            AgentId::Moderator => "moderator",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentId::Quantitative => "Statistics Expert",
            AgentId::TimeDecay => "Time Decay Analyst",
            AgentId::TraderFlow => "Trader Flow Analyst",
            AgentId::News => "News Analyst",
            AgentId::Macro => "Macro Analyst",
            AgentId::Contrarian => "Devil's Advocate",
            AgentId::Moderator => "Moderator",
        }
    }
}

/// One agent's entry in the transcript. Position in the transcript vector
/// is the ordinal; entries are never reordered or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub agent: AgentId,
    pub content: String,
}

impl Contribution {
    pub fn author(&self) -> &'static str {
        self.agent.display_name()
    }
}

/// Accumulating state for one debate run. Created fresh per invocation,
/// mutated only by appending contributions and setting the verdict once.
#[derive(Debug, Clone)]
pub struct DebateState {
    pub run_id: Uuid,
    pub market: MarketSnapshot,
    /// 24h price series, 0-100, oldest first; may be empty
    pub prices_24h: Vec<f64>,
    /// 7d price series, coarser fidelity
    pub prices_7d: Vec<f64>,
    pub traders: Vec<TraderSnapshot>,
    pub transcript: Vec<Contribution>,
    pub verdict: String,
}

impl DebateState {
    pub fn new(
        market: MarketSnapshot,
        prices_24h: Vec<f64>,
        prices_7d: Vec<f64>,
        traders: Vec<TraderSnapshot>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            market,
            prices_24h,
            prices_7d,
            traders,
            transcript: Vec::new(),
            verdict: String::new(),
        }
    }

    /// The series technical analysis runs on: the 7d window when present,
    /// else whatever the 24h window has.
    pub fn analysis_series(&self) -> &[f64] {
        if !self.prices_7d.is_empty() {
            &self.prices_7d
        } else {
            &self.prices_24h
        }
    }

    /// Everything said so far, rendered for inclusion in later prompts.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|c| format!("**{}**: {}", c.author(), c.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A debate participant. Reads the whole state, returns one contribution.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> AgentId;
    async fn speak(&self, state: &DebateState) -> Result<Contribution>;
}

/// Registry plus executor. Holds the full agent roster; which agents
/// actually speak in a given run is decided by the toggles at plan time.
pub struct DebateRunner {
    agents: HashMap<AgentId, Box<dyn Agent>>,
}

impl DebateRunner {
    /// Build the standard roster around the injected LLM and search
    /// capabilities.
    pub fn new(llm: Arc<dyn CompletionClient>, search: Arc<dyn SearchProvider>) -> Self {
        let roster: Vec<Box<dyn Agent>> = vec![
            Box::new(QuantAgent::new(llm.clone())),
            Box::new(TimeDecayAgent::new(llm.clone())),
            Box::new(TraderFlowAgent::new(llm.clone())),
            Box::new(NewsAgent::new(llm.clone(), search)),
            Box::new(MacroAgent::new(llm.clone())),
            Box::new(ContrarianAgent::new(llm.clone())),
            Box::new(Moderator::new(llm)),
        ];
        Self::with_agents(roster)
    }

    /// Custom roster, used by tests to substitute scripted agents.
    pub fn with_agents(roster: Vec<Box<dyn Agent>>) -> Self {
        let mut agents = HashMap::new();
        for agent in roster {
            agents.insert(agent.id(), agent);
        }
        Self { agents }
    }

    /// Deterministic execution plan: canonical order filtered by the
    /// toggles, moderator appended last. The same toggles always produce
    /// the same plan and no agent appears twice. An enabled agent missing
    /// from the registry is a programming error and fails here, before
    /// anything runs.
    pub fn plan(&self, toggles: &AgentToggles) -> Result<Vec<AgentId>> {
        let enabled = |id: &AgentId| match id {
            AgentId::Quantitative => toggles.quantitative,
            AgentId::TimeDecay => toggles.time_decay,
            AgentId::TraderFlow => toggles.trader_flow,
            AgentId::News => toggles.news,
            AgentId::Macro => toggles.macro_analyst,
            AgentId::Contrarian => toggles.contrarian,
            AgentId::Moderator => true,
        };

        let mut plan: Vec<AgentId> = AgentId::CANONICAL_ORDER
            .iter()
            .filter(|id| enabled(id))
            .copied()
            .collect();
        plan.push(AgentId::Moderator);

        for id in &plan {
            if !self.agents.contains_key(id) {
                return Err(DebateError::UnknownAgent(id.as_str().to_string()));
            }
        }
        Ok(plan)
    }

    /// Run the debate to completion, strictly sequentially. Every planned
    /// agent lands exactly one contribution in the transcript; failures
    /// become degraded contributions rather than aborting the run.
    pub async fn run(&self, toggles: &AgentToggles, state: &mut DebateState) -> Result<()> {
        let plan = self.plan(toggles)?;
        tracing::info!(
            run_id = %state.run_id,
            plan = ?plan.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            "Starting debate for '{}'",
            state.market.question
        );

        for id in plan {
            let agent = self.agents.get(&id).expect("plan is checked against registry");

            match agent.speak(state).await {
                Ok(contribution) => {
                    tracing::info!(agent = id.as_str(), "Agent contributed");
                    if id == AgentId::Moderator {
                        state.verdict = contribution.content.clone();
                    }
                    state.transcript.push(contribution);
                }
                Err(e) => {
                    tracing::warn!(agent = id.as_str(), "Agent failed: {}", e);
                    state.transcript.push(Contribution {
                        agent: id,
                        content: format!("(Failed to analyze) {e}"),
                    });
                    if id == AgentId::Moderator {
                        state.verdict = FALLBACK_VERDICT.to_string();
                    }
                }
            }
        }

        Ok(())
    }
}
