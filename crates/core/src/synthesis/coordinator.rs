//! # Lesson Coordinator
//!
//! Drives one generation request end to end:
//! research -> synthesis (retry, then fallback) -> image enrichment ->
//! normalization -> validation gate.
//!
//! Collaborators are request-local; build a new coordinator per request.

use super::enrichment::{ensure_image_blocks, EnrichmentOutcome};
use super::events::{LessonEvent, LessonEventKind};
use super::fallback::build_fallback_bundle;
use super::gate::validate_lesson_bundle;
use super::normalizer::normalize_bundle;
use super::notes::ResearchNotes;
use super::prompt::{build_synthesis_prompt, STRICT_SCHEMA_REMINDER};
use super::research::{run_research, ResearchCapability};
use super::stages::{RetryMachine, RetryOutcome};
use crate::config::{GenerationConfig, ResearchSettings};
use crate::error::Result;
use crate::schema::LessonPlanBundle;
use crate::state::output::{write_lessons_to_directory, LessonFileInfo};
use crate::tools::search::SearchProvider;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Generation capability: turns an instruction into a bundle
#[async_trait]
pub trait LessonSynthesizer: Send + Sync {
    /// Produce a bundle, or fail with `LessonError::SchemaValidation` when the
    /// output does not match the document model.
    async fn synthesize(&self, instruction: &str) -> Result<LessonPlanBundle>;
}

/// Accepted output of one generation request
#[derive(Debug, Clone)]
pub struct LessonGenerationResult {
    pub notes: ResearchNotes,
    pub bundle: LessonPlanBundle,
    /// Whether research notes came from the research capability or direct search
    pub research_outcome: RetryOutcome,
    /// Whether the bundle came from the generation capability or the fallback assembler
    pub synthesis_outcome: RetryOutcome,
}

pub struct LessonCoordinator {
    research: Arc<dyn ResearchCapability>,
    synthesizer: Arc<dyn LessonSynthesizer>,
    search: Arc<dyn SearchProvider>,
    max_steps: u32,
    events: Vec<LessonEvent>,
    event_tx: Option<mpsc::Sender<LessonEvent>>,
}

impl LessonCoordinator {
    pub fn new(
        research: Arc<dyn ResearchCapability>,
        synthesizer: Arc<dyn LessonSynthesizer>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            research,
            synthesizer,
            search,
            max_steps: ResearchSettings::default().max_steps,
            events: Vec::new(),
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<LessonEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Override the research step budget
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Events emitted so far
    pub fn events(&self) -> &[LessonEvent] {
        &self.events
    }

    async fn emit(&mut self, event: LessonEvent) {
        event.log();
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run research and synthesis and return an accepted bundle.
    ///
    /// Schema failures never escape: after two attempts the bundle is
    /// assembled from search results. Validation gate failures are fatal.
    #[tracing::instrument(skip(self, config), fields(topic = %config.topic, lessons = config.num_lessons))]
    pub async fn generate(&mut self, config: &GenerationConfig) -> Result<LessonGenerationResult> {
        let (notes, research_outcome) = self.research_phase(config).await?;

        self.emit(
            LessonEvent::new(LessonEventKind::SynthesisStarted)
                .with_data(json!({"topic": config.topic, "notes_entries": notes.len()})),
        )
        .await;

        let (mut bundle, synthesis_outcome) = self.synthesis_phase(config, &notes).await?;

        match ensure_image_blocks(&mut bundle, &config.topic, self.search.as_ref()).await {
            EnrichmentOutcome::Skipped => {
                self.emit(
                    LessonEvent::new(LessonEventKind::ImageEnrichmentSkipped)
                        .with_data(json!({"reason": "all sections have images"})),
                )
                .await;
            }
            EnrichmentOutcome::Failed { error } => {
                self.emit(
                    LessonEvent::new(LessonEventKind::ImageEnrichmentFailed)
                        .with_data(json!({"error": error})),
                )
                .await;
            }
            EnrichmentOutcome::Enriched { missing, attached } => {
                tracing::info!(missing, attached, "Attached supplemental images");
            }
        }

        normalize_bundle(&mut bundle, &config.topic);
        validate_lesson_bundle(&bundle)?;

        self.emit(
            LessonEvent::new(LessonEventKind::SynthesisCompleted)
                .with_data(json!({"lessons": bundle.lessons.len()})),
        )
        .await;

        Ok(LessonGenerationResult {
            notes,
            bundle,
            research_outcome,
            synthesis_outcome,
        })
    }

    /// Run [`LessonCoordinator::generate`] and write the lessons to `output_dir`.
    pub async fn generate_lessons_to_disk(
        &mut self,
        config: &GenerationConfig,
        output_dir: &Path,
    ) -> Result<Vec<LessonFileInfo>> {
        let result = self.generate(config).await?;
        let infos = write_lessons_to_directory(&result, output_dir).await?;
        self.emit(
            LessonEvent::new(LessonEventKind::LessonFilesWritten).with_data(json!({
                "count": infos.len(),
                "output_dir": output_dir.display().to_string(),
            })),
        )
        .await;
        Ok(infos)
    }

    async fn research_phase(
        &mut self,
        config: &GenerationConfig,
    ) -> Result<(ResearchNotes, RetryOutcome)> {
        let request = config.research_request(self.max_steps);
        self.emit(
            LessonEvent::new(LessonEventKind::ResearchStarted)
                .with_data(json!({"topic": request.topic, "level": request.level})),
        )
        .await;

        let mut notes = ResearchNotes::new(&config.topic, config.level, &config.audience);
        let outcome = run_research(
            self.research.as_ref(),
            self.search.as_ref(),
            &request,
            &mut notes,
        )
        .await?;

        if outcome == RetryOutcome::Fallback {
            self.emit(
                LessonEvent::new(LessonEventKind::ResearchBudgetExceeded)
                    .with_data(json!({"topic": request.topic, "limit": request.max_steps})),
            )
            .await;
        }
        self.emit(
            LessonEvent::new(LessonEventKind::ResearchCompleted)
                .with_data(json!({"topic": request.topic, "entries": notes.len()})),
        )
        .await;
        Ok((notes, outcome))
    }

    async fn synthesis_phase(
        &mut self,
        config: &GenerationConfig,
        notes: &ResearchNotes,
    ) -> Result<(LessonPlanBundle, RetryOutcome)> {
        let mut prompt = build_synthesis_prompt(config, notes);
        let mut machine = RetryMachine::synthesis();
        let mut bundle = None;
        let mut last_error = String::new();

        while machine.should_attempt() {
            let attempt = machine.begin_attempt();
            match self.synthesizer.synthesize(&prompt).await {
                Ok(generated) => {
                    bundle = Some(generated);
                    machine.succeed();
                }
                Err(e) if e.is_retryable_synthesis() => {
                    last_error = e.to_string();
                    if machine.fail() {
                        self.emit(
                            LessonEvent::new(LessonEventKind::SynthesisRetry)
                                .with_data(json!({"attempt": attempt, "error": last_error})),
                        )
                        .await;
                        prompt.push_str(STRICT_SCHEMA_REMINDER);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        match bundle {
            Some(bundle) => Ok((bundle, RetryOutcome::Primary)),
            None => {
                self.emit(
                    LessonEvent::new(LessonEventKind::SynthesisError)
                        .with_data(json!({"error": last_error, "attempts": machine.attempts})),
                )
                .await;
                let bundle = build_fallback_bundle(config, notes, self.search.as_ref()).await?;
                machine.finish_fallback();
                Ok((bundle, RetryOutcome::Fallback))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LessonError, ValidationError};
    use crate::schema::tests::sample_bundle;
    use crate::skills::offline::{StaticResearch, StaticSearch, StaticSynthesizer};
    use crate::synthesis::research::ResearchFindings;
    use crate::tools::search::SearchResult;
    use pretty_assertions::assert_eq;

    fn research() -> Arc<StaticResearch> {
        Arc::new(StaticResearch::new(ResearchFindings {
            summary: "Finding A about retrieval pipelines and evaluation.".to_string(),
            citations: vec!["https://example.com".to_string()],
        }))
    }

    fn search() -> Arc<StaticSearch> {
        Arc::new(StaticSearch::new(vec![
            SearchResult::new("Guide", "https://example.com/guide")
                .with_summary("Chunking and retrieval evaluation for production RAG systems."),
            SearchResult::new("Paper", "https://example.com/paper")
                .with_image_url("https://example.com/figure.png"),
        ]))
    }

    fn kinds(coordinator: &LessonCoordinator) -> Vec<LessonEventKind> {
        coordinator.events().iter().map(|e| e.kind).collect()
    }

    #[tokio::test]
    async fn test_schema_failures_retry_once_then_fall_back() {
        let synthesizer = Arc::new(StaticSynthesizer::always_invalid());
        let mut coordinator = LessonCoordinator::new(research(), synthesizer.clone(), search());
        let config = GenerationConfig::new("RAG").with_num_lessons(1);

        let result = coordinator.generate(&config).await.unwrap();

        assert_eq!(synthesizer.attempts(), 2);
        let prompts = synthesizer.prompts();
        assert!(!prompts[0].contains("STRICT SCHEMA REMINDER"));
        assert!(prompts[1].ends_with(STRICT_SCHEMA_REMINDER));
        assert_eq!(result.synthesis_outcome, RetryOutcome::Fallback);
        assert_eq!(result.bundle.lessons.len(), 1);
        assert_eq!(result.bundle.lessons[0].topic, "RAG - Lesson 1");
        assert_eq!(
            result.bundle.lessons[0].sources[0].source_id,
            "https://example.com/guide"
        );

        let kinds = kinds(&coordinator);
        assert!(kinds.contains(&LessonEventKind::SynthesisRetry));
        assert!(kinds.contains(&LessonEventKind::SynthesisError));
        assert_eq!(kinds.last(), Some(&LessonEventKind::SynthesisCompleted));
    }

    #[tokio::test]
    async fn test_generated_bundle_is_accepted() {
        let synthesizer = Arc::new(StaticSynthesizer::new(sample_bundle()));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer.clone(), search());

        let result = coordinator.generate(&GenerationConfig::new("LangChain")).await.unwrap();

        assert_eq!(synthesizer.attempts(), 1);
        assert_eq!(result.synthesis_outcome, RetryOutcome::Primary);
        assert_eq!(result.research_outcome, RetryOutcome::Primary);
        assert_eq!(result.notes.len(), 1);
        assert_eq!(
            kinds(&coordinator),
            vec![
                LessonEventKind::ResearchStarted,
                LessonEventKind::ResearchCompleted,
                LessonEventKind::SynthesisStarted,
                LessonEventKind::ImageEnrichmentSkipped,
                LessonEventKind::SynthesisCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_generated_bundle_gets_enriched() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0]
            .content_blocks
            .retain(|b| !b.is_image());
        let synthesizer = Arc::new(StaticSynthesizer::new(bundle));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer, search());

        let result = coordinator.generate(&GenerationConfig::new("LangChain")).await.unwrap();
        assert!(result.bundle.lessons[0].sections[0].has_image());
    }

    #[tokio::test]
    async fn test_enrichment_failure_is_not_fatal() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0]
            .content_blocks
            .retain(|b| !b.is_image());
        let synthesizer = Arc::new(StaticSynthesizer::new(bundle));
        let search = Arc::new(StaticSearch::failing("search offline"));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer, search);

        let result = coordinator.generate(&GenerationConfig::new("LangChain")).await.unwrap();
        assert!(!result.bundle.lessons[0].sections[0].has_image());
        assert!(kinds(&coordinator).contains(&LessonEventKind::ImageEnrichmentFailed));
    }

    #[tokio::test]
    async fn test_non_schema_errors_propagate() {
        let synthesizer = Arc::new(StaticSynthesizer::failing("rate limited"));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer.clone(), search());

        let err = coordinator.generate(&GenerationConfig::new("RAG")).await.unwrap_err();
        assert!(matches!(err, LessonError::Synthesis { .. }));
        assert_eq!(synthesizer.attempts(), 1);
    }

    #[tokio::test]
    async fn test_gate_failure_is_fatal() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sources.clear();
        let synthesizer = Arc::new(StaticSynthesizer::new(bundle));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer, search());

        let err = coordinator.generate(&GenerationConfig::new("RAG")).await.unwrap_err();
        assert!(matches!(
            err,
            LessonError::Validation(ValidationError::MissingCitations { lesson: 1 })
        ));
    }

    #[tokio::test]
    async fn test_research_request_carries_run_parameters() {
        let research = research();
        let synthesizer = Arc::new(StaticSynthesizer::new(sample_bundle()));
        let mut coordinator = LessonCoordinator::new(research.clone(), synthesizer, search())
            .with_max_steps(4);
        let config = GenerationConfig::new("LangChain")
            .with_audience("Data teams")
            .with_goals("Ship a retrieval demo");

        coordinator.generate(&config).await.unwrap();

        let requests = research.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].topic, "LangChain");
        assert_eq!(requests[0].audience, "Data teams");
        assert_eq!(requests[0].goals, "Ship a retrieval demo");
        assert_eq!(requests[0].max_steps, 4);
    }

    #[tokio::test]
    async fn test_research_budget_fallback_emits_event() {
        let research = Arc::new(StaticResearch::budget_exceeded(15));
        let synthesizer = Arc::new(StaticSynthesizer::new(sample_bundle()));
        let mut coordinator = LessonCoordinator::new(research, synthesizer, search());

        let result = coordinator.generate(&GenerationConfig::new("RAG")).await.unwrap();
        assert_eq!(result.research_outcome, RetryOutcome::Fallback);
        assert!(result.notes.entries()[0].content.starts_with("Key findings for RAG:"));
        assert!(kinds(&coordinator).contains(&LessonEventKind::ResearchBudgetExceeded));
    }

    #[tokio::test]
    async fn test_missing_search_credential_propagates_from_fallback() {
        let synthesizer = Arc::new(StaticSynthesizer::always_invalid());
        let search = Arc::new(StaticSearch::missing_credential());
        let mut coordinator = LessonCoordinator::new(research(), synthesizer, search);

        let err = coordinator.generate(&GenerationConfig::new("RAG")).await.unwrap_err();
        assert!(matches!(err, LessonError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn test_events_stream_to_channel() {
        let (tx, mut rx) = mpsc::channel(32);
        let synthesizer = Arc::new(StaticSynthesizer::new(sample_bundle()));
        let mut coordinator =
            LessonCoordinator::new(research(), synthesizer, search()).with_event_channel(tx);

        coordinator.generate(&GenerationConfig::new("RAG")).await.unwrap();
        drop(coordinator);

        let mut streamed = Vec::new();
        while let Some(event) = rx.recv().await {
            streamed.push(event.kind);
        }
        assert_eq!(streamed.first(), Some(&LessonEventKind::ResearchStarted));
        assert_eq!(streamed.last(), Some(&LessonEventKind::SynthesisCompleted));
    }

    #[tokio::test]
    async fn test_generate_lessons_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = Arc::new(StaticSynthesizer::new(sample_bundle()));
        let mut coordinator = LessonCoordinator::new(research(), synthesizer, search());

        let infos = coordinator
            .generate_lessons_to_disk(&GenerationConfig::new("LangChain"), dir.path())
            .await
            .unwrap();
        assert_eq!(infos.len(), 1);
        assert!(infos[0].path.exists());
        assert_eq!(
            coordinator.events().last().map(|e| e.kind),
            Some(LessonEventKind::LessonFilesWritten)
        );
    }
}
