//! # Research Phase
//!
//! Runs the research capability under its step budget and falls back to a
//! direct search summary when the budget is exceeded.

use super::notes::ResearchNotes;
use super::stages::{RetryMachine, RetryOutcome};
use crate::config::ResearchRequest;
use crate::error::{LessonError, Result};
use crate::tools::search::{SearchProvider, SearchResult};
use async_trait::async_trait;
use radkit::macros::LLMOutput;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const FALLBACK_RESULT_COUNT: usize = 5;
const SNIPPET_MAX_CHARS: usize = 320;
const EMPTY_FINDINGS: &str = "No findings were produced.";

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"));

/// Final summary produced by a research run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ResearchFindings {
    /// Slide-ready talking points for instructors
    pub summary: String,
    /// URLs of the sources backing the summary
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Research capability consumed by the pipeline
#[async_trait]
pub trait ResearchCapability: Send + Sync {
    /// Research the request, or fail with `LessonError::StepBudgetExceeded`.
    async fn research(&self, request: &ResearchRequest) -> Result<ResearchFindings>;
}

/// Run research into `notes`, falling back to direct search on budget exhaustion.
///
/// Errors other than `StepBudgetExceeded` propagate.
pub async fn run_research(
    capability: &dyn ResearchCapability,
    search: &dyn SearchProvider,
    request: &ResearchRequest,
    notes: &mut ResearchNotes,
) -> Result<RetryOutcome> {
    let mut machine = RetryMachine::research();

    while machine.should_attempt() {
        machine.begin_attempt();
        match capability.research(request).await {
            Ok(findings) => {
                let summary = if findings.summary.trim().is_empty() {
                    EMPTY_FINDINGS.to_string()
                } else {
                    findings.summary
                };
                notes.add_entry(summary, findings.citations);
                machine.succeed();
            }
            Err(LessonError::StepBudgetExceeded { max_steps }) => {
                tracing::warn!(topic = %request.topic, max_steps, "Research step budget exceeded");
                machine.fail();
            }
            Err(e) => return Err(e),
        }
    }

    if machine.is_falling_back() {
        let (summary, citations) = fallback_research_summary(search, request).await?;
        notes.add_entry(summary, citations);
        machine.finish_fallback();
    }

    Ok(machine.outcome().unwrap_or(RetryOutcome::Primary))
}

/// Summarize a direct search into a numbered list of findings.
pub async fn fallback_research_summary(
    search: &dyn SearchProvider,
    request: &ResearchRequest,
) -> Result<(String, Vec<String>)> {
    let results = search
        .search(&request.search_query(), FALLBACK_RESULT_COUNT)
        .await?;
    Ok(summarize_results(&request.topic, &results))
}

fn summarize_results(topic: &str, results: &[SearchResult]) -> (String, Vec<String>) {
    if results.is_empty() {
        return (
            format!(
                "Unable to retrieve external data for {}. Provide high-level best practices.",
                topic
            ),
            Vec::new(),
        );
    }

    let mut bullets = Vec::with_capacity(results.len());
    let mut citations = Vec::new();
    for (idx, item) in results.iter().enumerate() {
        if let Some(url) = item.url.as_deref().filter(|u| !u.is_empty()) {
            citations.push(url.to_string());
        }
        let title = item
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Source insight");
        let snippet = clean_fallback_snippet(&item.summary);
        let detail = if snippet.is_empty() {
            "Review the referenced source for concrete practices."
        } else {
            snippet.as_str()
        };
        bullets.push(format!("{}. {}: {}", idx + 1, title, detail));
    }

    let content = format!(
        "Key findings for {}:\n{}\n\nUse these evidence-backed talking points when designing the lesson outline.",
        topic,
        bullets.join("\n")
    );
    (content, citations)
}

/// Collapse whitespace, drop `TODO:` markers and cap at 320 characters.
pub fn clean_fallback_snippet(snippet: &str) -> String {
    let without_markers = snippet.replace("TODO:", "");
    let collapsed = WHITESPACE_PATTERN.replace_all(&without_markers, " ");
    let cleaned = collapsed.trim();
    if cleaned.chars().count() <= SNIPPET_MAX_CHARS {
        return cleaned.to_string();
    }
    let head: String = cleaned.chars().take(SNIPPET_MAX_CHARS - 3).collect();
    format!("{}...", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LearnerLevel;
    use crate::skills::offline::{StaticResearch, StaticSearch};
    use pretty_assertions::assert_eq;

    fn request() -> ResearchRequest {
        ResearchRequest::new("RAG", LearnerLevel::Beginner, "Engineers")
    }

    fn notes() -> ResearchNotes {
        ResearchNotes::new("RAG", LearnerLevel::Beginner, "Engineers")
    }

    #[tokio::test]
    async fn test_successful_research_adds_one_entry() {
        let research = StaticResearch::new(ResearchFindings {
            summary: "Chunk documents carefully.".to_string(),
            citations: vec!["https://example.com".to_string()],
        });
        let mut notes = notes();
        let outcome = run_research(&research, &StaticSearch::empty(), &request(), &mut notes)
            .await
            .unwrap();
        assert_eq!(outcome, RetryOutcome::Primary);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.entries()[0].citations, vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_empty_findings_are_replaced() {
        let research = StaticResearch::new(ResearchFindings::default());
        let mut notes = notes();
        run_research(&research, &StaticSearch::empty(), &request(), &mut notes)
            .await
            .unwrap();
        assert_eq!(notes.entries()[0].content, EMPTY_FINDINGS);
    }

    #[tokio::test]
    async fn test_budget_exceeded_uses_direct_search() {
        let research = StaticResearch::budget_exceeded(15);
        let search = StaticSearch::new(vec![
            SearchResult::new("Guide", "https://example.com/guide")
                .with_summary("  Use   hybrid search. TODO: expand "),
            SearchResult::default(),
        ]);
        let mut notes = notes();
        let outcome = run_research(&research, &search, &request(), &mut notes)
            .await
            .unwrap();

        assert_eq!(outcome, RetryOutcome::Fallback);
        let entry = &notes.entries()[0];
        assert_eq!(
            entry.content,
            "Key findings for RAG:\n\
             1. Guide: Use hybrid search. expand\n\
             2. Source insight: Review the referenced source for concrete practices.\n\n\
             Use these evidence-backed talking points when designing the lesson outline."
        );
        assert_eq!(entry.citations, vec!["https://example.com/guide"]);
        assert_eq!(
            search.queries(),
            vec!["RAG Build comprehensive lesson research notes.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_budget_exceeded_without_results() {
        let research = StaticResearch::budget_exceeded(3);
        let mut notes = notes();
        run_research(&research, &StaticSearch::empty(), &request(), &mut notes)
            .await
            .unwrap();
        let entry = &notes.entries()[0];
        assert!(entry.content.starts_with("Unable to retrieve external data for RAG."));
        assert!(entry.citations.is_empty());
    }

    #[tokio::test]
    async fn test_other_research_errors_propagate() {
        let research = StaticResearch::failing("provider unavailable");
        let mut notes = notes();
        let err = run_research(&research, &StaticSearch::empty(), &request(), &mut notes)
            .await
            .unwrap_err();
        assert!(matches!(err, LessonError::Research { .. }));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "word ".repeat(100);
        let cleaned = clean_fallback_snippet(&long);
        assert!(cleaned.chars().count() <= SNIPPET_MAX_CHARS);
        assert!(cleaned.ends_with("..."));
    }
}
