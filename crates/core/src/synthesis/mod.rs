//! # Lesson Synthesis
//!
//! The synthesis-and-normalization pipeline.
//!
//! ## Stages
//!
//! 1. `research` - Research capability under a step budget, direct search on exhaustion
//! 2. `coordinator` - Generation with one strict-schema retry, then `fallback`
//! 3. `enrichment` - Image gap-fill from supplemental search results
//! 4. `normalizer` - Sanitize text fields and backfill defaults
//! 5. `gate` - Final acceptance check

pub mod coordinator;
pub mod enrichment;
pub mod events;
pub mod fallback;
pub mod gate;
pub mod normalizer;
pub mod notes;
pub mod prompt;
pub mod research;
pub mod stages;

pub use coordinator::{LessonCoordinator, LessonGenerationResult, LessonSynthesizer};
pub use events::{LessonEvent, LessonEventKind};
pub use notes::{ResearchEntry, ResearchNotes};
pub use research::{ResearchCapability, ResearchFindings};
pub use stages::{RetryMachine, RetryOutcome, RetryStage};
