//! # Offline Collaborators
//!
//! Deterministic in-process implementations of the research, generation and
//! search capabilities. They back `--mock-run` and the pipeline tests, and
//! record the calls they receive.

use crate::config::ResearchRequest;
use crate::error::{LessonError, Result};
use crate::schema::{
    ContentBlock, ImageBlock, LessonPlan, LessonPlanBundle, LessonSection, ReferenceResource,
    ResourceType, SourceCitation,
};
use crate::synthesis::{LessonSynthesizer, ResearchCapability, ResearchFindings};
use crate::tools::search::{SearchProvider, SearchResult, VALYU_API_KEY_VAR};
use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

pub const MOCK_SOURCE_URL: &str = "https://example.com";

fn recorded<T: Clone>(calls: &Mutex<Vec<T>>) -> Vec<T> {
    calls.lock().map(|c| c.clone()).unwrap_or_default()
}

fn record<T>(calls: &Mutex<Vec<T>>, value: T) {
    if let Ok(mut c) = calls.lock() {
        c.push(value);
    }
}

enum ResearchBehavior {
    Findings(ResearchFindings),
    BudgetExceeded(u32),
    Fail(String),
}

/// Research capability returning fixed findings
pub struct StaticResearch {
    behavior: ResearchBehavior,
    requests: Mutex<Vec<ResearchRequest>>,
}

impl StaticResearch {
    pub fn new(findings: ResearchFindings) -> Self {
        Self::with_behavior(ResearchBehavior::Findings(findings))
    }

    /// Mock notes used by `--mock-run`
    pub fn mock(topic: &str) -> Self {
        Self::new(ResearchFindings {
            summary: format!("Mock research notes for {}. Include citations.", topic),
            citations: vec![MOCK_SOURCE_URL.to_string()],
        })
    }

    pub fn budget_exceeded(max_steps: u32) -> Self {
        Self::with_behavior(ResearchBehavior::BudgetExceeded(max_steps))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(ResearchBehavior::Fail(message.into()))
    }

    fn with_behavior(behavior: ResearchBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ResearchRequest> {
        recorded(&self.requests)
    }
}

#[async_trait]
impl ResearchCapability for StaticResearch {
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchFindings> {
        record(&self.requests, request.clone());
        match &self.behavior {
            ResearchBehavior::Findings(findings) => Ok(findings.clone()),
            ResearchBehavior::BudgetExceeded(max_steps) => Err(LessonError::StepBudgetExceeded {
                max_steps: *max_steps,
            }),
            ResearchBehavior::Fail(message) => Err(LessonError::Research {
                message: message.clone(),
            }),
        }
    }
}

enum SynthesisBehavior {
    Bundle(Box<LessonPlanBundle>),
    Invalid,
    Fail(String),
}

/// Generation capability returning a fixed bundle
pub struct StaticSynthesizer {
    behavior: SynthesisBehavior,
    prompts: Mutex<Vec<String>>,
}

impl StaticSynthesizer {
    pub fn new(bundle: LessonPlanBundle) -> Self {
        Self::with_behavior(SynthesisBehavior::Bundle(Box::new(bundle)))
    }

    /// Always fails with a schema validation error.
    pub fn always_invalid() -> Self {
        Self::with_behavior(SynthesisBehavior::Invalid)
    }

    /// Always fails with a non-retryable synthesis error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(SynthesisBehavior::Fail(message.into()))
    }

    fn with_behavior(behavior: SynthesisBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of synthesize calls received
    pub fn attempts(&self) -> usize {
        self.prompts().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        recorded(&self.prompts)
    }
}

#[async_trait]
impl LessonSynthesizer for StaticSynthesizer {
    async fn synthesize(&self, instruction: &str) -> Result<LessonPlanBundle> {
        record(&self.prompts, instruction.to_string());
        match &self.behavior {
            SynthesisBehavior::Bundle(bundle) => Ok(bundle.as_ref().clone()),
            SynthesisBehavior::Invalid => Err(LessonError::SchemaValidation(
                "lessons: field required".to_string(),
            )),
            SynthesisBehavior::Fail(message) => Err(LessonError::Synthesis {
                message: message.clone(),
            }),
        }
    }
}

enum SearchBehavior {
    Results(Vec<SearchResult>),
    MissingCredential,
    Fail(String),
}

/// Search capability returning fixed results
pub struct StaticSearch {
    behavior: SearchBehavior,
    calls: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self::with_behavior(SearchBehavior::Results(results))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn missing_credential() -> Self {
        Self::with_behavior(SearchBehavior::MissingCredential)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(SearchBehavior::Fail(message.into()))
    }

    fn with_behavior(behavior: SearchBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        recorded(&self.calls).into_iter().map(|(q, _)| q).collect()
    }

    pub fn requested_counts(&self) -> Vec<usize> {
        recorded(&self.calls).into_iter().map(|(_, n)| n).collect()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        record(&self.calls, (query.to_string(), max_results));
        match &self.behavior {
            SearchBehavior::Results(results) => {
                Ok(results.iter().take(max_results).cloned().collect())
            }
            SearchBehavior::MissingCredential => Err(LessonError::MissingCredential {
                var: VALYU_API_KEY_VAR.to_string(),
            }),
            SearchBehavior::Fail(message) => Err(LessonError::search(message.clone())),
        }
    }
}

/// Single-section bundle citing `https://example.com`, one lesson per slot.
pub fn mock_bundle(
    topic: &str,
    level: crate::schema::LearnerLevel,
    audience: &str,
    num_lessons: usize,
    duration_minutes: u32,
) -> Result<LessonPlanBundle> {
    let source_url = Url::parse(MOCK_SOURCE_URL).map_err(|e| LessonError::Synthesis {
        message: e.to_string(),
    })?;

    let mut lessons = Vec::with_capacity(num_lessons.max(1));
    for idx in 0..num_lessons.max(1) {
        let section = LessonSection {
            title: "Overview".to_string(),
            summary: format!("Introduce the core ideas behind {} step by step.", topic),
            key_points: vec![
                "Key concept one".to_string(),
                "Key concept two".to_string(),
            ],
            content_blocks: vec![
                ContentBlock::text(format!(
                    "Walk learners through the essential vocabulary and workflow of {}.",
                    topic
                ))?,
                ImageBlock::new(format!(
                    "Slide illustration showing the main building blocks of {}.",
                    topic
                ))?
                .with_caption(format!("Visual reference: {}", topic))
                .into(),
            ],
        };
        lessons.push(LessonPlan {
            topic: format!("{} - Lesson {}", topic, idx + 1),
            level,
            audience: audience.to_string(),
            estimated_duration_minutes: duration_minutes.max(1),
            learning_objectives: vec![format!("Understand the basics of {}", topic)],
            prerequisites: Vec::new(),
            sections: vec![section],
            recommended_resources: vec![ReferenceResource {
                title: "Example resource".to_string(),
                kind: ResourceType::Article,
                url: Some(source_url.clone()),
                notes: None,
            }],
            sources: vec![SourceCitation::new(MOCK_SOURCE_URL, "Example source")],
        });
    }

    Ok(LessonPlanBundle {
        topic: topic.to_string(),
        level,
        audience: audience.to_string(),
        lessons,
    })
}
