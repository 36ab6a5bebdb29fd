//! # Image Enrichment
//!
//! Best-effort gap-fill that attaches one illustrative image block to every
//! section that lacks one, using supplemental search results.

use super::fallback::image_block_from_result;
use crate::schema::{ContentBlock, LessonPlanBundle};
use crate::tools::search::SearchProvider;

const MIN_ENRICHMENT_RESULTS: usize = 4;

/// What the enrichment step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Every section already had an image
    Skipped,
    /// The search capability failed; the bundle is untouched
    Failed { error: String },
    /// Images were attached to `attached` of `missing` sections
    Enriched { missing: usize, attached: usize },
}

/// Attach image blocks to sections without one, consuming results in order.
pub async fn ensure_image_blocks(
    bundle: &mut LessonPlanBundle,
    topic: &str,
    search: &dyn SearchProvider,
) -> EnrichmentOutcome {
    let missing = bundle
        .lessons
        .iter()
        .flat_map(|lesson| lesson.sections.iter())
        .filter(|section| !section.has_image())
        .count();
    if missing == 0 {
        return EnrichmentOutcome::Skipped;
    }

    let query = format!("{} visuals for instruction", topic);
    let max_results = (missing * 2).max(MIN_ENRICHMENT_RESULTS);
    let results = match search.search(&query, max_results).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, "Image enrichment search failed");
            return EnrichmentOutcome::Failed {
                error: e.to_string(),
            };
        }
    };

    let mut candidates = results.iter();
    let mut attached = 0;
    let sections = bundle
        .lessons
        .iter_mut()
        .flat_map(|lesson| lesson.sections.iter_mut())
        .filter(|section| !section.has_image());
    for section in sections {
        let Some(candidate) = candidates.next() else {
            break;
        };
        let label = if section.title.trim().is_empty() {
            topic
        } else {
            section.title.as_str()
        };
        if let Some(block) = image_block_from_result(candidate, label) {
            section.content_blocks.push(ContentBlock::from(block));
            attached += 1;
        }
    }

    tracing::debug!(missing, attached, "Image enrichment finished");
    EnrichmentOutcome::Enriched { missing, attached }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::sample_bundle;
    use crate::skills::offline::StaticSearch;
    use crate::tools::search::SearchResult;

    fn bundle_without_images(sections: usize) -> LessonPlanBundle {
        let mut bundle = sample_bundle();
        let template = bundle.lessons[0].sections[0].clone();
        bundle.lessons[0].sections = (0..sections)
            .map(|i| {
                let mut section = template.clone();
                section.title = format!("Section {}", i);
                section.content_blocks.retain(|b| !b.is_image());
                section
            })
            .collect();
        bundle
    }

    #[tokio::test]
    async fn test_attaches_images_in_order() {
        let mut bundle = bundle_without_images(3);
        let search = StaticSearch::new(vec![
            SearchResult::new("First", "https://example.com/1"),
            SearchResult::new("Second", "https://example.com/2"),
        ]);

        let outcome = ensure_image_blocks(&mut bundle, "LangChain", &search).await;
        assert_eq!(outcome, EnrichmentOutcome::Enriched { missing: 3, attached: 2 });

        let sections = &bundle.lessons[0].sections;
        assert!(sections[0].has_image());
        assert!(sections[1].has_image());
        assert!(!sections[2].has_image());
        let caption = sections[0]
            .content_blocks
            .iter()
            .find_map(ContentBlock::as_image)
            .and_then(|b| b.caption());
        assert_eq!(caption, Some("Visual reference: First"));

        assert_eq!(
            search.queries(),
            vec!["LangChain visuals for instruction".to_string()]
        );
        assert_eq!(search.requested_counts(), vec![6]);
    }

    fn image_caption(section: &crate::schema::LessonSection) -> Option<&str> {
        section
            .content_blocks
            .iter()
            .filter_map(ContentBlock::as_image)
            .last()
            .and_then(|b| b.caption())
    }

    #[tokio::test]
    async fn test_results_follow_section_order_across_lessons() {
        let mut bundle = bundle_without_images(1);
        let with_image = sample_bundle().lessons[0].sections[0].clone();
        bundle.lessons[0].sections.push(with_image);
        let mut second = bundle.lessons[0].clone();
        second.sections = bundle_without_images(1).lessons[0].sections.clone();
        second.sections[0].title = "Later".to_string();
        bundle.lessons.push(second);

        let search = StaticSearch::new(vec![
            SearchResult::new("First", "https://example.com/1"),
            SearchResult::new("Second", "https://example.com/2"),
            SearchResult::new("Third", "https://example.com/3"),
        ]);
        let outcome = ensure_image_blocks(&mut bundle, "LangChain", &search).await;
        assert_eq!(outcome, EnrichmentOutcome::Enriched { missing: 2, attached: 2 });

        let first = &bundle.lessons[0].sections;
        assert_eq!(image_caption(&first[0]), Some("Visual reference: First"));
        assert_eq!(image_caption(&first[1]), Some("Pipeline overview"));
        assert_eq!(
            first[1].content_blocks.iter().filter(|b| b.is_image()).count(),
            1
        );
        assert_eq!(
            image_caption(&bundle.lessons[1].sections[0]),
            Some("Visual reference: Second")
        );
    }

    #[tokio::test]
    async fn test_minimum_result_request() {
        let mut bundle = bundle_without_images(1);
        let search = StaticSearch::empty();
        ensure_image_blocks(&mut bundle, "LangChain", &search).await;
        assert_eq!(search.requested_counts(), vec![4]);
    }

    #[tokio::test]
    async fn test_skipped_when_all_sections_have_images() {
        let mut bundle = sample_bundle();
        let search = StaticSearch::empty();
        let outcome = ensure_image_blocks(&mut bundle, "LangChain", &search).await;
        assert_eq!(outcome, EnrichmentOutcome::Skipped);
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_is_not_fatal() {
        let mut bundle = bundle_without_images(2);
        let before = bundle.clone();
        let search = StaticSearch::failing("quota exceeded");
        let outcome = ensure_image_blocks(&mut bundle, "LangChain", &search).await;
        assert!(matches!(outcome, EnrichmentOutcome::Failed { ref error } if error.contains("quota exceeded")));
        assert_eq!(bundle, before);
    }
}
