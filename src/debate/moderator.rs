//! The moderator closes every debate

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Result;
use crate::llm::CompletionClient;

use super::{Agent, AgentId, Contribution, DebateState};

/// Synthesizes the transcript into a verdict. Always the last speaker; the
/// executor copies its content into the state's verdict field (or the
/// fixed fallback when it fails).
pub struct Moderator {
    llm: Arc<dyn CompletionClient>,
}

impl Moderator {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for Moderator {
    fn id(&self) -> AgentId {
        AgentId::Moderator
    }

    async fn speak(&self, state: &DebateState) -> Result<Contribution> {
        let context = if state.transcript.is_empty() {
            "No arguments presented.".to_string()
        } else {
            state.transcript_text()
        };

        let prompt = format!(
            "You are the Moderator of the Debate Floor.\n\
             Today's date is: {}\n\
             \n\
             Review the arguments from the experts:\n\
             \n\
             {}\n\
             \n\
             Market: \"{}\"\n\
             \n\
             1. Summarize the key points for YES and NO.\n\
             2. Weigh the evidence.\n\
             3. Provide a Final Verdict: \"Buy YES\", \"Buy NO\", or \"Stay Neutral\".\n\
             4. Provide a confidence score (0-100%).\n\
             \n\
             Format nicely with Markdown.",
            Utc::now().format("%Y-%m-%d"),
            context,
            state.market.question
        );

        let verdict = self.llm.complete(&prompt).await?;

        Ok(Contribution {
            agent: self.id(),
            content: verdict,
        })
    }
}
