//! # Bundle Normalizer
//!
//! Rewrites every free-text field of a bundle through the sanitizer and
//! backfills blank fields with topic-derived defaults.

use crate::schema::{ContentBlock, LessonPlanBundle, LessonSection};
use crate::tools::sanitize::{polish_text, strip_navigation_tokens, truncate_at_word};

const MAX_FIELD_CHARS: usize = 1200;
const SUMMARY_SENTENCES: usize = 4;
const TEXT_BLOCK_SENTENCES: usize = 6;
const IMAGE_PROMPT_SENTENCES: usize = 2;
const CAPTION_MAX_CHARS: usize = 120;

/// Polish the bundle in place.
pub fn normalize_bundle(bundle: &mut LessonPlanBundle, topic: &str) {
    for lesson in &mut bundle.lessons {
        if lesson.topic.trim().is_empty() {
            lesson.topic = topic.to_string();
        } else {
            lesson.topic = lesson.topic.trim().to_string();
        }

        lesson.learning_objectives = non_blank_or(
            std::mem::take(&mut lesson.learning_objectives),
            || {
                vec![
                    format!("Describe the most important practices for {}.", topic),
                    "Connect the practices to real implementation scenarios.".to_string(),
                ]
            },
        );

        for section in &mut lesson.sections {
            normalize_section(section, topic);
        }
    }
}

fn normalize_section(section: &mut LessonSection, topic: &str) {
    let title = section.title.trim();
    section.title = if title.is_empty() {
        format!("Essential Concepts for {}", topic)
    } else {
        title.to_string()
    };

    section.summary = polish_text(&section.summary, SUMMARY_SENTENCES, MAX_FIELD_CHARS);

    let stripped = section
        .key_points
        .iter()
        .map(|point| strip_navigation_tokens(point))
        .collect();
    section.key_points = non_blank_or(stripped, || {
        vec![format!("Summarize how to apply {} in production.", topic)]
    });

    let had_blocks = !section.content_blocks.is_empty();
    let mut blocks = Vec::with_capacity(section.content_blocks.len());
    for mut block in std::mem::take(&mut section.content_blocks) {
        match &mut block {
            ContentBlock::Text(text) => {
                let polished = polish_text(text.text(), TEXT_BLOCK_SENTENCES, MAX_FIELD_CHARS);
                // Text with nothing left after sanitizing is dropped.
                if text.set_text(polished).is_err() {
                    continue;
                }
            }
            ContentBlock::Image(image) => {
                let polished =
                    polish_text(image.prompt(), IMAGE_PROMPT_SENTENCES, MAX_FIELD_CHARS);
                if image.set_prompt(polished).is_err() {
                    let _ = image.set_prompt(format!("Illustrate the concept: {}", section.title));
                }
                let caption = image
                    .caption()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or(section.title.as_str());
                let caption = truncate_at_word(caption, CAPTION_MAX_CHARS);
                image.set_caption(Some(caption));
            }
        }
        blocks.push(block);
    }

    if had_blocks && blocks.is_empty() {
        let sentence = format!(
            "Walk through {} and how it applies to {}.",
            section.title, topic
        );
        if let Ok(block) = ContentBlock::text(sentence) {
            blocks.push(block);
        }
    }
    section.content_blocks = blocks;
}

fn non_blank_or(items: Vec<String>, fallback: impl FnOnce() -> Vec<String>) -> Vec<String> {
    let values: Vec<String> = items
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        fallback()
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::sample_bundle;
    use crate::schema::ImageBlock;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_navigation_prefixed_summary_is_cleaned() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0].summary =
            "Home Pricing Docs. Detailed walkthrough of RAG deployments.".to_string();
        normalize_bundle(&mut bundle, "RAG");

        let summary = &bundle.lessons[0].sections[0].summary;
        assert!(!summary.contains("Home"));
        assert!(summary.contains("Detailed walkthrough of RAG deployments"));
    }

    #[test]
    fn test_blank_fields_are_backfilled() {
        let mut bundle = sample_bundle();
        let lesson = &mut bundle.lessons[0];
        lesson.topic = "  ".to_string();
        lesson.learning_objectives = vec![" ".to_string()];
        lesson.sections[0].title = String::new();
        lesson.sections[0].key_points = vec!["Home Docs".to_string()];

        normalize_bundle(&mut bundle, "RAG");

        let lesson = &bundle.lessons[0];
        assert_eq!(lesson.topic, "RAG");
        assert_eq!(
            lesson.learning_objectives,
            vec![
                "Describe the most important practices for RAG.",
                "Connect the practices to real implementation scenarios.",
            ]
        );
        assert_eq!(lesson.sections[0].title, "Essential Concepts for RAG");
        assert_eq!(
            lesson.sections[0].key_points,
            vec!["Summarize how to apply RAG in production."]
        );
    }

    #[test]
    fn test_long_caption_trimmed_at_word() {
        let mut bundle = sample_bundle();
        let caption = format!("Visual reference: {}", "retrieval pipeline ".repeat(6));
        assert!(caption.chars().count() > 120);
        let image = ImageBlock::new("Diagram of retrieval stages for instructors to present.")
            .unwrap()
            .with_caption(caption);
        bundle.lessons[0].sections[0].content_blocks[1] = image.into();

        normalize_bundle(&mut bundle, "RAG");

        let block = bundle.lessons[0].sections[0].content_blocks[1]
            .as_image()
            .unwrap();
        let caption = block.caption().unwrap();
        assert!(caption.chars().count() <= 120);
        assert!(caption.starts_with("Visual reference:"));
        assert!(caption.ends_with("..."));
    }

    #[test]
    fn test_missing_caption_uses_section_title() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0].content_blocks[1] =
            ImageBlock::new("Architecture diagram of a retrieval pipeline.").unwrap().into();
        normalize_bundle(&mut bundle, "RAG");
        let block = bundle.lessons[0].sections[0].content_blocks[1]
            .as_image()
            .unwrap();
        assert_eq!(block.caption(), Some("Overview"));
    }

    #[test]
    fn test_noisy_text_block_is_dropped_when_others_remain() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0].content_blocks[0] =
            ContentBlock::text("**Home** [Docs](https://x.y) Pricing").unwrap();
        normalize_bundle(&mut bundle, "RAG");

        let blocks = &bundle.lessons[0].sections[0].content_blocks;
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_image());
        assert!(blocks
            .iter()
            .filter_map(ContentBlock::as_text)
            .all(|text| !text.contains("Home")));
    }

    #[test]
    fn test_noisy_only_block_becomes_topic_sentence() {
        let mut bundle = sample_bundle();
        bundle.lessons[0].sections[0].content_blocks =
            vec![ContentBlock::text("**Home** | [Docs](https://x.y) Pricing").unwrap()];
        normalize_bundle(&mut bundle, "RAG");

        let blocks = &bundle.lessons[0].sections[0].content_blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].as_text(),
            Some("Walk through Overview and how it applies to RAG.")
        );
    }
}
