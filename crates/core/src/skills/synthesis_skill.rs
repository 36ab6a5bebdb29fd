//! # Synthesis Skill
//!
//! Generation capability backed by a radkit LlmFunction that returns a
//! `LessonPlanBundle` as structured output.

use crate::error::{LessonError, Result};
use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::schema::LessonPlanBundle;
use crate::skills::prompts::SYNTHESIS_SYSTEM;
use crate::synthesis::LessonSynthesizer;
use async_trait::async_trait;

pub struct SynthesisSkill {
    config: ModelConfig,
}

impl SynthesisSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    async fn run_function(&self, instruction: String) -> anyhow::Result<LessonPlanBundle> {
        run_llm_function!(&self.config, LessonPlanBundle, SYNTHESIS_SYSTEM, instruction)
    }
}

#[async_trait]
impl LessonSynthesizer for SynthesisSkill {
    /// Structured-output failures and document model violations both surface
    /// as `SchemaValidation` so the coordinator can retry them.
    async fn synthesize(&self, instruction: &str) -> Result<LessonPlanBundle> {
        self.config.ensure_credentials()?;

        let bundle = self
            .run_function(instruction.to_string())
            .await
            .map_err(|e| LessonError::SchemaValidation(e.to_string()))?;
        bundle
            .validate()
            .map_err(|e| LessonError::SchemaValidation(e.to_string()))?;

        tracing::info!(lessons = bundle.lessons.len(), "Synthesis produced a bundle");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LlmProvider;

    #[tokio::test]
    async fn test_missing_credential_is_not_retryable() {
        std::env::remove_var("OPENROUTER_API_KEY");
        let skill = SynthesisSkill::new(ModelConfig::with_provider(
            LlmProvider::OpenRouter,
            "anthropic/claude-3.5-sonnet",
        ));
        let err = skill.synthesize("Topic: RAG").await.unwrap_err();
        assert!(!err.is_retryable_synthesis());
        assert_eq!(err.to_string(), "OPENROUTER_API_KEY is not set in the environment.");
    }
}
