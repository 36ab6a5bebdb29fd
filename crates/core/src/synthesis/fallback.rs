//! # Fallback Assembly
//!
//! Deterministic bundle built from research notes and raw search results when
//! the generation capability keeps producing invalid output.

use super::notes::ResearchNotes;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::schema::{
    ContentBlock, ImageBlock, LessonPlan, LessonPlanBundle, LessonSection, ReferenceResource,
    ResourceType, SourceCitation,
};
use crate::tools::sanitize::{clean_summary_text, DEFAULT_MAX_SENTENCES};
use crate::tools::search::{SearchProvider, SearchResult, SEARCH_PROVIDER_URL};
use url::Url;

pub const PLACEHOLDER_SOURCE_URL: &str = "https://open-research.example/reference";

const RESULTS_PER_LESSON: usize = 2;
const SECTION_TEXT_SENTENCES: usize = 6;
const SECTION_SUMMARY_CHARS: usize = 600;
const MAX_KEY_POINTS: usize = 3;
const IMAGE_PROMPT_MAX_CHARS: usize = 500;

/// Query the search capability and assemble a fallback bundle.
///
/// A missing search credential propagates to the caller.
pub async fn build_fallback_bundle(
    config: &GenerationConfig,
    notes: &ResearchNotes,
    search: &dyn SearchProvider,
) -> Result<LessonPlanBundle> {
    let query = format!("{} {}", config.topic, config.goals);
    let max_results = (config.lesson_count() * 3).max(6);
    let results = search.search(query.trim(), max_results).await?;
    tracing::debug!(results = results.len(), "Assembling fallback bundle");
    assemble_fallback_bundle(config, notes, &results)
}

/// Build one single-section lesson per requested slot.
pub fn assemble_fallback_bundle(
    config: &GenerationConfig,
    notes: &ResearchNotes,
    results: &[SearchResult],
) -> Result<LessonPlanBundle> {
    let topic = config.topic.as_str();
    let mut lessons = Vec::with_capacity(config.lesson_count());

    for idx in 0..config.lesson_count() {
        let entry = notes.entry_for_slot(idx);

        let mut section_text = entry
            .map(|e| clean_summary_text(&e.content, SECTION_TEXT_SENTENCES))
            .unwrap_or_default();
        if section_text.is_empty() {
            section_text = format!("Overview of {}.", topic);
        }
        let summary: String = section_text.chars().take(SECTION_SUMMARY_CHARS).collect();

        let key_points = match entry {
            Some(e) if !e.citations.is_empty() => {
                e.citations.iter().take(MAX_KEY_POINTS).cloned().collect()
            }
            _ => vec!["Highlight the practical takeaways from referenced materials.".to_string()],
        };

        let items = source_items(results, idx);

        let mut content_blocks = vec![ContentBlock::text(section_text)?];
        content_blocks.extend(
            items
                .iter()
                .filter_map(|item| image_block_from_result(item, topic))
                .map(ContentBlock::from),
        );

        let sources = citations_for(items);
        let recommended_resources = sources.iter().map(resource_for).collect();

        lessons.push(LessonPlan {
            topic: format!("{} - Lesson {}", topic, idx + 1),
            level: config.level,
            audience: config.audience.clone(),
            estimated_duration_minutes: config.estimated_duration_minutes.max(1),
            learning_objectives: vec![
                format!("Review the curated {} insights.", topic),
                "Translate findings into learner-facing activities.".to_string(),
                "Connect cited references to concrete practices.".to_string(),
            ],
            prerequisites: Vec::new(),
            sections: vec![LessonSection {
                title: format!("Key Insights for {}", topic),
                summary,
                key_points,
                content_blocks,
            }],
            recommended_resources,
            sources,
        });
    }

    Ok(LessonPlanBundle {
        topic: config.topic.clone(),
        level: config.level,
        audience: config.audience.clone(),
        lessons,
    })
}

/// Results `[2*idx, 2*idx+2)`, or the first two when that slice is empty.
pub fn source_items(results: &[SearchResult], idx: usize) -> &[SearchResult] {
    let start = (idx * RESULTS_PER_LESSON).min(results.len());
    let end = (start + RESULTS_PER_LESSON).min(results.len());
    let slice = &results[start..end];
    if slice.is_empty() {
        &results[..results.len().min(RESULTS_PER_LESSON)]
    } else {
        slice
    }
}

fn citations_for(items: &[SearchResult]) -> Vec<SourceCitation> {
    let sources: Vec<SourceCitation> = items
        .iter()
        .map(|item| {
            SourceCitation::new(
                non_empty(item.url.as_deref()).unwrap_or(PLACEHOLDER_SOURCE_URL),
                non_empty(item.title.as_deref()).unwrap_or("Curated research reference"),
            )
        })
        .collect();
    if sources.is_empty() {
        return vec![SourceCitation::new(
            PLACEHOLDER_SOURCE_URL,
            "Fallback reference generated from curated research.",
        )];
    }
    sources
}

fn resource_for(source: &SourceCitation) -> ReferenceResource {
    let url = if source.source_id == SEARCH_PROVIDER_URL {
        None
    } else {
        Url::parse(&source.source_id).ok()
    };
    ReferenceResource {
        title: source.description.clone(),
        kind: ResourceType::Article,
        url,
        notes: None,
    }
}

/// Build a slide image block from a raw search result.
pub fn image_block_from_result(item: &SearchResult, topic: &str) -> Option<ImageBlock> {
    let hint_source = non_empty(item.image_prompt_hint.as_deref())
        .or_else(|| non_empty(Some(item.summary.as_str())))
        .unwrap_or_default();
    let mut hint = clean_summary_text(hint_source, DEFAULT_MAX_SENTENCES);
    if hint.is_empty() {
        hint = format!("Illustrate the central idea behind {}.", topic);
    }
    let title = non_empty(item.title.as_deref()).unwrap_or(topic);
    let prompt: String = format!("Slide illustration for {}: {}", title, hint)
        .chars()
        .take(IMAGE_PROMPT_MAX_CHARS)
        .collect();

    let block = ImageBlock::new(prompt)
        .ok()?
        .with_caption(format!("Visual reference: {}", title));

    let candidate = non_empty(item.image_url.as_deref())
        .or_else(|| non_empty(item.thumbnail_url.as_deref()))
        .or_else(|| non_empty(item.url.as_deref()));
    match candidate
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .and_then(|u| Url::parse(u).ok())
    {
        Some(url) => Some(block.with_url(url)),
        None => Some(block),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
