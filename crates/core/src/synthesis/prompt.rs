//! Synthesis instruction composition.

use super::notes::ResearchNotes;
use crate::config::GenerationConfig;
use crate::schema::LessonPlanBundle;
use crate::skills::prompts::SYNTHESIS_INSTRUCTIONS;

/// Suffix appended to the instruction after a schema failure
pub const STRICT_SCHEMA_REMINDER: &str = "\n\nSTRICT SCHEMA REMINDER: Respond with a single JSON object that matches the provided schema. Do not omit the `lessons` list and do not add commentary outside the JSON.";

/// Build the instruction handed to the generation capability.
pub fn build_synthesis_prompt(config: &GenerationConfig, notes: &ResearchNotes) -> String {
    let instructions = SYNTHESIS_INSTRUCTIONS
        .trim()
        .replace("{schema}", &LessonPlanBundle::json_schema_string());
    format!(
        "{instructions}\n\n\
         Topic: {topic}\n\
         Learner level: {level}\n\
         Audience: {audience}\n\
         Target number of lessons: {count}\n\
         Estimated duration minutes: {duration}\n\
         Goals: {goals}\n\
         Writing style: slide-ready, instructor-facing, no references to research tools or search engines.\n\
         Visual guidance: each section should describe at least one compelling visual that aids teaching.\n\n\
         Research Notes:\n\
         {notes}\n",
        instructions = instructions,
        topic = config.topic,
        level = config.level,
        audience = config.audience,
        count = config.lesson_count(),
        duration = config.estimated_duration_minutes,
        goals = config.goals,
        notes = notes.as_markdown(),
    )
}
