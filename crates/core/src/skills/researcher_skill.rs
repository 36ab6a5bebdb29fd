//! # Researcher Skill
//!
//! Research capability backed by a radkit LlmWorker with web search, page
//! fetching and local resource tools. The step budget is enforced as a
//! wall-clock timeout of `max_steps * seconds_per_step`.

use crate::config::{ResearchRequest, ResearchSettings};
use crate::error::{LessonError, Result};
use crate::models::ModelConfig;
use crate::run_llm_worker;
use crate::skills::prompts::RESEARCHER;
use crate::skills::tools::{resource_tools, search_tools};
use crate::synthesis::research::{ResearchCapability, ResearchFindings};
use async_trait::async_trait;

pub struct ResearcherSkill {
    config: ModelConfig,
    settings: ResearchSettings,
}

impl ResearcherSkill {
    pub fn new(config: ModelConfig, settings: ResearchSettings) -> Self {
        Self { config, settings }
    }

    /// Request message handed to the worker.
    pub fn build_request(request: &ResearchRequest) -> String {
        format!(
            "Topic: {}\n\
             Learner level: {}\n\
             Audience: {}\n\
             Goals: {}\n\
             Constraints: Gather evidence with the available research tools. Keep the final \
             summary self-contained and never reference the tools, API providers, or how the \
             information was gathered.\n\n\
             Conduct deep research and return findings with citations.",
            request.topic, request.level, request.audience, request.goals
        )
    }

    async fn run_worker(&self, prompt: String) -> anyhow::Result<ResearchFindings> {
        run_llm_worker!(
            &self.config,
            ResearchFindings,
            RESEARCHER,
            prompt,
            search_tools::search_web,
            search_tools::fetch_web_page,
            resource_tools::load_local_resource,
        )
    }
}

#[async_trait]
impl ResearchCapability for ResearcherSkill {
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchFindings> {
        self.config.ensure_credentials()?;

        let budget = self.settings.budget(request.max_steps);
        tracing::info!(
            topic = %request.topic,
            level = %request.level,
            budget_secs = budget.as_secs(),
            "Starting research"
        );

        match tokio::time::timeout(budget, self.run_worker(Self::build_request(request))).await {
            Ok(Ok(findings)) => Ok(findings),
            Ok(Err(e)) => Err(LessonError::Research {
                message: e.to_string(),
            }),
            Err(_) => Err(LessonError::StepBudgetExceeded {
                max_steps: request.max_steps,
            }),
        }
    }
}
