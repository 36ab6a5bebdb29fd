//! # Lessons Skills
//!
//! LLM-backed implementations of the pipeline's capabilities, plus offline
//! stand-ins.
//!
//! ## Architecture
//!
//! ```text
//! Skill (ResearchCapability / LessonSynthesizer)
//!   └── radkit LlmWorker / LlmFunction
//!         └── Tools (#[tool] functions)
//! ```
//!
//! - `ResearcherSkill` - Research with web search, page fetch and local resources
//! - `SynthesisSkill` - Structured lesson bundle generation
//! - `offline` - Static collaborators for mock runs and tests

pub mod llm_helpers;
pub mod offline;
pub mod prompts;
pub mod researcher_skill;
pub mod synthesis_skill;
pub mod tools;

pub use offline::{StaticResearch, StaticSearch, StaticSynthesizer};
pub use researcher_skill::ResearcherSkill;
pub use synthesis_skill::SynthesisSkill;
