//! # Research Notes
//!
//! Append-only log of research findings for one generation request.

use crate::schema::LearnerLevel;
use serde::{Deserialize, Serialize};

/// A single finding and the sources backing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchEntry {
    pub content: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Aggregated research notes handed read-only to synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchNotes {
    pub topic: String,
    pub level: LearnerLevel,
    pub audience: String,
    #[serde(default)]
    entries: Vec<ResearchEntry>,
}

impl ResearchNotes {
    pub fn new(topic: impl Into<String>, level: LearnerLevel, audience: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            level,
            audience: audience.into(),
            entries: Vec::new(),
        }
    }

    pub fn add_entry(&mut self, content: impl Into<String>, citations: Vec<String>) {
        self.entries.push(ResearchEntry {
            content: content.into(),
            citations,
        });
    }

    pub fn entries(&self) -> &[ResearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for lesson slot `idx`, clamped to the last entry.
    pub fn entry_for_slot(&self, idx: usize) -> Option<&ResearchEntry> {
        self.entries.get(idx).or_else(|| self.entries.last())
    }

    /// Render as one `## Finding N` block per entry, in append order.
    pub fn as_markdown(&self) -> String {
        let mut lines = vec![
            format!("# Research Notes: {} ({})", self.topic, self.level),
            String::new(),
        ];
        for (idx, entry) in self.entries.iter().enumerate() {
            lines.push(format!("## Finding {}", idx + 1));
            lines.push(entry.content.trim().to_string());
            if !entry.citations.is_empty() {
                lines.push(String::new());
                lines.push("Sources:".to_string());
                lines.extend(entry.citations.iter().map(|cite| format!("- {}", cite)));
            }
            lines.push(String::new());
        }
        lines.join("\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markdown_rendering() {
        let mut notes = ResearchNotes::new("RAG", LearnerLevel::Beginner, "Engineers");
        notes.add_entry("  Chunk documents carefully.  ", vec!["https://example.com".to_string()]);
        notes.add_entry("Evaluate retrieval quality.", Vec::new());

        let expected = "# Research Notes: RAG (beginner)\n\n\
                        ## Finding 1\nChunk documents carefully.\n\nSources:\n- https://example.com\n\n\
                        ## Finding 2\nEvaluate retrieval quality.";
        assert_eq!(notes.as_markdown(), expected);
        assert_eq!(notes.as_markdown(), notes.as_markdown());
    }

    #[test]
    fn test_entry_slot_clamps_to_last() {
        let mut notes = ResearchNotes::new("RAG", LearnerLevel::Intermediate, "Engineers");
        assert!(notes.entry_for_slot(0).is_none());

        notes.add_entry("First", Vec::new());
        notes.add_entry("Second", Vec::new());
        assert_eq!(notes.entry_for_slot(0).map(|e| e.content.as_str()), Some("First"));
        assert_eq!(notes.entry_for_slot(5).map(|e| e.content.as_str()), Some("Second"));
    }
}
