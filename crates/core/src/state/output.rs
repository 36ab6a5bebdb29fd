//! # Lesson Output
//!
//! Writes an accepted bundle to disk: one pretty-printed JSON file per lesson
//! plus an index file describing the run.

use crate::error::Result;
use crate::synthesis::LessonGenerationResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A lesson file written by [`write_lessons_to_directory`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonFileInfo {
    pub path: PathBuf,
    pub lesson_id: String,
    /// 1-based position in the bundle
    pub lesson_index: usize,
}

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    lesson_index: usize,
    file: String,
    lesson_topic: &'a str,
}

#[derive(Debug, Serialize)]
struct IndexFile<'a> {
    topic: &'a str,
    level: &'a str,
    audience: &'a str,
    generated_at: String,
    lessons: Vec<IndexEntry<'a>>,
}

/// Persist every lesson of `result` under `output_dir`, creating it if needed.
pub async fn write_lessons_to_directory(
    result: &LessonGenerationResult,
    output_dir: &Path,
) -> Result<Vec<LessonFileInfo>> {
    fs::create_dir_all(output_dir).await?;

    let bundle = &result.bundle;
    let topic_slug = slugify(&bundle.topic);
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();

    let mut infos = Vec::with_capacity(bundle.lessons.len());
    let mut entries = Vec::with_capacity(bundle.lessons.len());

    for (idx, lesson) in bundle.lessons.iter().enumerate() {
        let lesson_index = idx + 1;
        let filename = format!("{}-lesson-{:02}-{}.json", topic_slug, lesson_index, timestamp);
        let path = output_dir.join(&filename);
        fs::write(&path, serde_json::to_string_pretty(lesson)?).await?;

        let lesson_id = if lesson.topic.trim().is_empty() {
            format!("{}-lesson-{}", topic_slug, lesson_index)
        } else {
            lesson.topic.clone()
        };
        tracing::debug!(path = %path.display(), "Wrote lesson file");

        entries.push(IndexEntry {
            lesson_index,
            file: filename,
            lesson_topic: &lesson.topic,
        });
        infos.push(LessonFileInfo {
            path,
            lesson_id,
            lesson_index,
        });
    }

    let index = IndexFile {
        topic: &bundle.topic,
        level: bundle.level.as_str(),
        audience: &bundle.audience,
        generated_at: Utc::now().to_rfc3339(),
        lessons: entries,
    };
    let index_path = output_dir.join(format!("{}-index-{}.json", topic_slug, timestamp));
    fs::write(&index_path, serde_json::to_string_pretty(&index)?).await?;

    Ok(infos)
}

/// Lowercase alphanumerics, other runs collapsed to `-`, `lesson` when empty.
pub fn slugify(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .flat_map(char::to_lowercase)
        .collect();
    let slug = mapped
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "lesson".to_string()
    } else {
        slug
    }
}
