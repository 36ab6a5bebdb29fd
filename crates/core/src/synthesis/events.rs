//! # Lesson Events
//!
//! Lifecycle telemetry emitted by the lesson pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of lesson pipeline event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LessonEventKind {
    /// Research phase started
    ResearchStarted,
    /// Research produced notes (possibly via fallback)
    ResearchCompleted,
    /// Research ran out of steps, falling back to direct search
    ResearchBudgetExceeded,
    /// Synthesis started
    SynthesisStarted,
    /// Synthesis attempt failed schema validation, retrying with reminder
    SynthesisRetry,
    /// Synthesis gave up, falling back to a search-assembled bundle
    SynthesisError,
    /// Every section already had an image
    ImageEnrichmentSkipped,
    /// Supplemental image search failed
    ImageEnrichmentFailed,
    /// Bundle accepted by the validation gate
    SynthesisCompleted,
    /// Lesson files persisted
    LessonFilesWritten,
}

impl LessonEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonEventKind::ResearchStarted => "research_started",
            LessonEventKind::ResearchCompleted => "research_completed",
            LessonEventKind::ResearchBudgetExceeded => "research_budget_exceeded",
            LessonEventKind::SynthesisStarted => "synthesis_started",
            LessonEventKind::SynthesisRetry => "synthesis_retry",
            LessonEventKind::SynthesisError => "synthesis_error",
            LessonEventKind::ImageEnrichmentSkipped => "image_enrichment_skipped",
            LessonEventKind::ImageEnrichmentFailed => "image_enrichment_failed",
            LessonEventKind::SynthesisCompleted => "synthesis_completed",
            LessonEventKind::LessonFilesWritten => "lesson_files_written",
        }
    }
}

/// An event in the lesson pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: LessonEventKind,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl LessonEvent {
    /// Create a new event
    pub fn new(kind: LessonEventKind) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Write the event to the tracing log as structured fields.
    pub fn log(&self) {
        let data = self
            .data
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();
        match self.kind {
            LessonEventKind::SynthesisError
            | LessonEventKind::ImageEnrichmentFailed
            | LessonEventKind::ResearchBudgetExceeded => {
                tracing::warn!(event = self.kind.as_str(), id = %self.id, data = %data, "lesson event");
            }
            _ => {
                tracing::info!(event = self.kind.as_str(), id = %self.id, data = %data, "lesson event");
            }
        }
    }
}

/// Time-ordered, process-unique event id
fn event_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let salt = RandomState::new().build_hasher().finish() as u32;
    format!("{:x}-{:x}", nanos, salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = LessonEvent::new(LessonEventKind::SynthesisCompleted).with_data(json!({"lessons": 2}));
        assert_eq!(event.kind, LessonEventKind::SynthesisCompleted);
        assert_eq!(event.data, Some(json!({"lessons": 2})));
    }

    #[test]
    fn test_kind_serializes_as_snake_case() {
        let value = serde_json::to_value(LessonEventKind::ImageEnrichmentSkipped).unwrap();
        assert_eq!(value, json!(LessonEventKind::ImageEnrichmentSkipped.as_str()));
    }
}
