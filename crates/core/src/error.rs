//! # Errors
//!
//! Error taxonomy for the lesson pipeline.
//!
//! - Recoverable: `SchemaValidation` (retry, then fallback), `StepBudgetExceeded`
//!   (direct search summary), search failures during image enrichment (skipped).
//! - Configuration: `MissingCredential` and `Config`, raised to the caller.
//! - Fatal: `Validation` raised by the final gate.

/// Top-level error type for the lessons core library.
#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("Research exceeded its step budget of {max_steps} steps")]
    StepBudgetExceeded { max_steps: u32 },

    #[error("{var} is not set in the environment.")]
    MissingCredential { var: String },

    #[error("Search failed: {message}")]
    Search { message: String },

    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Research failed: {message}")]
    Research { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LessonError {
    /// Whether a synthesis attempt that failed this way may be retried.
    pub fn is_retryable_synthesis(&self) -> bool {
        matches!(self, LessonError::SchemaValidation(_))
    }

    pub fn search(message: impl Into<String>) -> Self {
        LessonError::Search {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for LessonError {
    fn from(err: figment::Error) -> Self {
        LessonError::Config(Box::new(err))
    }
}

/// Structural violations of the lesson document model and the final gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Text content blocks must include non-empty text.")]
    EmptyText,

    #[error("Image content blocks must include an image_prompt.")]
    EmptyImagePrompt,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Section '{section}' must include at least one key point.")]
    EmptyKeyPoints { section: String },

    #[error("Section '{section}' must include at least one content block.")]
    EmptyContentBlocks { section: String },

    #[error("Lesson '{lesson}' must include at least one learning objective.")]
    EmptyObjectives { lesson: String },

    #[error("Lesson '{lesson}' must include at least one section.")]
    EmptySections { lesson: String },

    #[error("Lesson '{lesson}' must have a positive duration.")]
    ZeroDuration { lesson: String },

    #[error("Citation '{source_id}' must include a description.")]
    EmptyCitationDescription { source_id: String },

    #[error("Lesson bundle must contain at least one lesson.")]
    EmptyBundle,

    #[error("Lesson {lesson} is missing citations/sources.")]
    MissingCitations { lesson: usize },

    #[error("Lesson {lesson} contains an empty section {section}.")]
    EmptySection { lesson: usize, section: String },
}

pub type Result<T> = std::result::Result<T, LessonError>;
