//! # Deterministic Tools
//!
//! Plain Rust helpers with no LLM involvement.
//!
//! - `sanitize` - Snippet cleanup and truncation
//! - `search` - Search capability trait and the Valyu deep-search client

pub mod sanitize;
pub mod search;

pub use search::{SearchProvider, SearchResult, ValyuSearchClient};
