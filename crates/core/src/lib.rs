//! # Lessons Core
//!
//! Research, synthesis and normalization pipeline for slide-ready lesson
//! plans. Turns noisy research notes and search metadata into a
//! schema-valid, citation-complete `LessonPlanBundle`.
//!
//! ## Architecture
//!
//! - `schema/` - Lesson document model and construction rules
//! - `synthesis/` - Coordinator, retry/fallback, enrichment, normalizer, gate
//! - `skills/` - radkit-backed research and generation capabilities
//! - `tools/` - Text sanitizing and the Valyu search client
//! - `state/` - Writing lesson bundles to disk
//! - `config` / `models` - Settings and LLM provider configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lessons_core::config::GenerationConfig;
//! use lessons_core::synthesis::LessonCoordinator;
//!
//! let mut coordinator = LessonCoordinator::new(research, synthesizer, search);
//! let config = GenerationConfig::new("Retrieval augmented generation");
//! let result = coordinator.generate(&config).await?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod skills;
pub mod state;
pub mod synthesis;
pub mod tools;

pub use error::{LessonError, Result, ValidationError};
