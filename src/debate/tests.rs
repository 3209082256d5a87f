//! Unit tests for the debate pipeline

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::AgentToggles;
    use crate::error::DebateError;
    use crate::llm::CompletionClient;
    use crate::search::SearchProvider;
    use crate::types::MarketSnapshot;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Agent that returns a fixed contribution, or a scripted failure.
    struct ScriptedAgent {
        id: AgentId,
        failure: Option<String>,
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        fn id(&self) -> AgentId {
            self.id
        }

        async fn speak(&self, _state: &DebateState) -> crate::error::Result<Contribution> {
            match &self.failure {
                Some(msg) => Err(DebateError::Api(msg.clone())),
                None => Ok(Contribution {
                    agent: self.id,
                    content: format!("{} weighs in", self.id.as_str()),
                }),
            }
        }
    }

    /// Agent that reports how much of the transcript it could see.
    struct ProbeAgent {
        id: AgentId,
    }

    #[async_trait]
    impl Agent for ProbeAgent {
        fn id(&self) -> AgentId {
            self.id
        }

        async fn speak(&self, state: &DebateState) -> crate::error::Result<Contribution> {
            Ok(Contribution {
                agent: self.id,
                content: format!("saw {} prior contributions", state.transcript.len()),
            })
        }
    }

    fn ok_agent(id: AgentId) -> Box<dyn Agent> {
        Box::new(ScriptedAgent { id, failure: None })
    }

    fn failing_agent(id: AgentId, msg: &str) -> Box<dyn Agent> {
        Box::new(ScriptedAgent {
            id,
            failure: Some(msg.to_string()),
        })
    }

    fn full_roster() -> Vec<Box<dyn Agent>> {
        let mut roster: Vec<Box<dyn Agent>> =
            AgentId::CANONICAL_ORDER.iter().map(|id| ok_agent(*id)).collect();
        roster.push(ok_agent(AgentId::Moderator));
        roster
    }

    fn make_state() -> DebateState {
        DebateState::new(
            MarketSnapshot {
                id: "0xmarket".to_string(),
                slug: Some("will-tests-pass".to_string()),
                question: "Will the tests pass?".to_string(),
                yes_price: 62.0,
                volume_24h: 10_000.0,
                volume_7d: 55_000.0,
                liquidity: 20_000.0,
                end_date: Some("2026-12-31T00:00:00Z".to_string()),
            },
            vec![60.0, 61.0, 62.0],
            vec![55.0, 58.0, 60.0, 61.0, 62.0],
            Vec::new(),
        )
    }

    fn all_disabled() -> AgentToggles {
        AgentToggles {
            quantitative: false,
            time_decay: false,
            trader_flow: false,
            news: false,
            macro_analyst: false,
            contrarian: false,
        }
    }

    #[test]
    fn test_plan_all_disabled_is_moderator_only() {
        let runner = DebateRunner::with_agents(full_roster());
        let plan = runner.plan(&all_disabled()).unwrap();
        assert_eq!(plan, vec![AgentId::Moderator]);
    }

    #[test]
    fn test_plan_contrarian_only() {
        let runner = DebateRunner::with_agents(full_roster());
        let mut toggles = all_disabled();
        toggles.contrarian = true;

        let plan = runner.plan(&toggles).unwrap();
        assert_eq!(plan, vec![AgentId::Contrarian, AgentId::Moderator]);
    }

    #[test]
    fn test_plan_full_roster_follows_canonical_order() {
        let runner = DebateRunner::with_agents(full_roster());
        let plan = runner.plan(&AgentToggles::default()).unwrap();

        assert_eq!(
            plan,
            vec![
                AgentId::Quantitative,
                AgentId::TimeDecay,
                AgentId::TraderFlow,
                AgentId::News,
                AgentId::Macro,
                AgentId::Contrarian,
                AgentId::Moderator,
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic_and_duplicate_free() {
        let runner = DebateRunner::with_agents(full_roster());
        let toggles = AgentToggles::default();

        let first = runner.plan(&toggles).unwrap();
        let second = runner.plan(&toggles).unwrap();
        assert_eq!(first, second);

        let mut seen = std::collections::HashSet::new();
        assert!(first.iter().all(|id| seen.insert(*id)));
    }

    #[test]
    fn test_plan_fails_fast_on_unregistered_agent() {
        // Roster is missing the quantitative agent but the toggles ask for it
        let roster: Vec<Box<dyn Agent>> = vec![ok_agent(AgentId::Moderator)];
        let runner = DebateRunner::with_agents(roster);

        let mut toggles = all_disabled();
        toggles.quantitative = true;

        match runner.plan(&toggles) {
            Err(DebateError::UnknownAgent(name)) => assert_eq!(name, "quantitative"),
            other => panic!("expected UnknownAgent, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_appends_one_contribution_per_planned_agent() {
        let runner = DebateRunner::with_agents(full_roster());
        let mut state = make_state();

        runner.run(&AgentToggles::default(), &mut state).await.unwrap();

        assert_eq!(state.transcript.len(), 7);
        let order: Vec<AgentId> = state.transcript.iter().map(|c| c.agent).collect();
        let plan = runner.plan(&AgentToggles::default()).unwrap();
        assert_eq!(order, plan);
        assert_eq!(state.verdict, "moderator weighs in");
    }

    #[tokio::test]
    async fn test_failed_agent_still_lands_a_contribution() {
        let mut roster = vec![
            ok_agent(AgentId::Quantitative),
            failing_agent(AgentId::News, "search backend down"),
            ok_agent(AgentId::Contrarian),
        ];
        roster.push(ok_agent(AgentId::Moderator));
        let runner = DebateRunner::with_agents(roster);

        let mut toggles = all_disabled();
        toggles.quantitative = true;
        toggles.news = true;
        toggles.contrarian = true;

        let mut state = make_state();
        runner.run(&toggles, &mut state).await.unwrap();

        // Nothing dropped: quant, news (degraded), contrarian, moderator
        assert_eq!(state.transcript.len(), 4);
        assert!(state.transcript[1].content.contains("(Failed to analyze)"));
        assert!(state.transcript[1].content.contains("search backend down"));
        // Later agents still ran after the failure
        assert_eq!(state.transcript[2].agent, AgentId::Contrarian);
        assert!(!state.verdict.is_empty());
    }

    #[tokio::test]
    async fn test_moderator_failure_uses_fallback_verdict() {
        let roster = vec![
            ok_agent(AgentId::Contrarian),
            failing_agent(AgentId::Moderator, "llm timeout"),
        ];
        let runner = DebateRunner::with_agents(roster);

        let mut toggles = all_disabled();
        toggles.contrarian = true;

        let mut state = make_state();
        runner.run(&toggles, &mut state).await.unwrap();

        assert_eq!(state.verdict, FALLBACK_VERDICT);
        // The failure is still visible in the transcript
        assert_eq!(state.transcript.len(), 2);
        assert!(state.transcript[1].content.contains("llm timeout"));
    }

    #[tokio::test]
    async fn test_later_agents_see_the_whole_transcript() {
        let mut roster: Vec<Box<dyn Agent>> = AgentId::CANONICAL_ORDER[..5]
            .iter()
            .map(|id| ok_agent(*id))
            .collect();
        roster.push(Box::new(ProbeAgent {
            id: AgentId::Contrarian,
        }));
        roster.push(Box::new(ProbeAgent {
            id: AgentId::Moderator,
        }));
        let runner = DebateRunner::with_agents(roster);

        let mut state = make_state();
        runner.run(&AgentToggles::default(), &mut state).await.unwrap();

        // Contrarian speaks sixth and sees all five analysts before it
        assert_eq!(state.transcript[5].content, "saw 5 prior contributions");
        assert_eq!(state.transcript[6].content, "saw 6 prior contributions");
    }

    #[test]
    fn test_transcript_text_carries_author_names() {
        let mut state = make_state();
        state.transcript.push(Contribution {
            agent: AgentId::Quantitative,
            content: "numbers look rich".to_string(),
        });
        state.transcript.push(Contribution {
            agent: AgentId::Contrarian,
            content: "numbers lie".to_string(),
        });

        let text = state.transcript_text();
        assert!(text.contains("**Statistics Expert**: numbers look rich"));
        assert!(text.contains("**Devil's Advocate**: numbers lie"));
    }

    #[test]
    fn test_analysis_series_prefers_7d() {
        let state = make_state();
        assert_eq!(state.analysis_series().len(), 5);

        let mut no_7d = make_state();
        no_7d.prices_7d.clear();
        assert_eq!(no_7d.analysis_series().len(), 3);

        no_7d.prices_24h.clear();
        assert!(no_7d.analysis_series().is_empty());
    }

    /// Completion double that records prompts and replays scripted
    /// responses in order.
    struct ScriptedLlm {
        prompts: Mutex<Vec<String>>,
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedLlm {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> crate::error::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| DebateError::Api("no scripted response left".into()))
        }
    }

    struct CannedSearch {
        results: Vec<String>,
    }

    #[async_trait]
    impl SearchProvider for CannedSearch {
        async fn search(&self, _query: &str) -> crate::error::Result<Vec<String>> {
            Ok(self.results.clone())
        }
    }

    #[tokio::test]
    async fn test_quant_agent_momentum_adjusts_the_kelly_estimate() {
        let llm = ScriptedLlm::new(&["looks rich, avoid"]);
        let agent = agents::QuantAgent::new(llm.clone());

        // Rising 7d series: 62 > short SMA 61 > long SMA 59.2, a strong
        // bullish ladder, so the Kelly estimate shifts +5 to 67
        let state = make_state();
        let contribution = agent.speak(&state).await.unwrap();

        assert_eq!(contribution.agent, AgentId::Quantitative);
        assert!(contribution
            .content
            .contains("Adjusted probability estimate: 67.0%"));
        assert!(contribution.content.contains("looks rich, avoid"));
        // The prompt carried the computed report to the LLM
        assert!(llm.prompts()[0].contains("Quantitative Analysis Report"));
    }

    #[tokio::test]
    async fn test_news_agent_dedups_search_results() {
        // First completion brainstorms queries, second writes the analysis
        let llm = ScriptedLlm::new(&["query one\nquery two\nquery three", "news verdict"]);
        let search = Arc::new(CannedSearch {
            results: vec!["result-a".to_string(), "result-b".to_string()],
        });
        let agent = agents::NewsAgent::new(llm.clone(), search);

        let state = make_state();
        let contribution = agent.speak(&state).await.unwrap();
        assert_eq!(contribution.content, "news verdict");

        // Three searches returned the same two snippets; the analysis
        // prompt must contain each only once
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1].matches("result-a").count(), 1);
        assert_eq!(prompts[1].matches("result-b").count(), 1);
    }

    #[tokio::test]
    async fn test_trader_flow_agent_skips_llm_without_traders() {
        let llm = ScriptedLlm::new(&[]);
        let agent = agents::TraderFlowAgent::new(llm.clone());

        let state = make_state();
        let contribution = agent.speak(&state).await.unwrap();

        assert!(contribution.content.contains("No notable trader activity"));
        assert!(llm.prompts().is_empty());
    }

    #[test]
    fn test_agent_id_labels() {
        assert_eq!(AgentId::Quantitative.as_str(), "quantitative");
        assert_eq!(AgentId::TimeDecay.as_str(), "time-decay");
        assert_eq!(AgentId::Contrarian.display_name(), "Devil's Advocate");
        assert_eq!(AgentId::Moderator.display_name(), "Moderator");
    }
}
