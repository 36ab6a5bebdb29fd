//! # Validation Gate
//!
//! Last hard check before a bundle is accepted. Failures here end the request.

use crate::error::ValidationError;
use crate::schema::LessonPlanBundle;

/// Reject bundles with no lessons, lessons without citations, or empty sections.
///
/// Lesson numbers in errors are 1-based.
pub fn validate_lesson_bundle(bundle: &LessonPlanBundle) -> Result<(), ValidationError> {
    if bundle.lessons.is_empty() {
        return Err(ValidationError::EmptyBundle);
    }
    for (idx, lesson) in bundle.lessons.iter().enumerate() {
        let number = idx + 1;
        if lesson.sources.is_empty() {
            return Err(ValidationError::MissingCitations { lesson: number });
        }
        if let Some(section) = lesson
            .sections
            .iter()
            .find(|section| section.content_blocks.is_empty())
        {
            return Err(ValidationError::EmptySection {
                lesson: number,
                section: section.title.clone(),
            });
        }
    }
    Ok(())
}
