//! # Radkit-Compatible Tools
//!
//! Tools annotated with `#[tool]` macro for use by the research agent.

pub mod resource_tools;
pub mod search_tools;
