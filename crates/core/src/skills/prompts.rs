//! Default prompt templates bundled at compile time.

/// Researcher - gathers cited findings with the research tools
pub const RESEARCHER: &str = include_str!("defaults/researcher.md");

/// Synthesis instructions; `{schema}` is replaced with the bundle JSON Schema
pub const SYNTHESIS_INSTRUCTIONS: &str = include_str!("defaults/synthesis.md");

/// Synthesis system prompt
pub const SYNTHESIS_SYSTEM: &str = include_str!("defaults/synthesis_system.md");

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("researcher", RESEARCHER),
        ("synthesis", SYNTHESIS_INSTRUCTIONS),
        ("synthesis_system", SYNTHESIS_SYSTEM),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_prompts_non_empty() {
        for (slug, content) in all_defaults() {
            assert!(!content.is_empty(), "Prompt '{}' should not be empty", slug);
            assert!(content.len() > 50, "Prompt '{}' seems too short", slug);
        }
    }

    #[test]
    fn test_synthesis_has_schema_placeholder() {
        assert_eq!(SYNTHESIS_INSTRUCTIONS.matches("{schema}").count(), 1);
    }
}
