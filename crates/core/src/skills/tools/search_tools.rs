//! # Search Tools
//!
//! Tools for web search and page retrieval used by the research agent.

use crate::config::LessonSettings;
use crate::error::Result;
use crate::tools::sanitize::{strip_html, truncate};
use crate::tools::search::{SearchProvider, ValyuSearchClient};
use radkit::macros::tool;
use radkit::tools::ToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MAX_SEARCH_RESULTS: u32 = 10;
const DEFAULT_SEARCH_RESULTS: u32 = 5;
const DEFAULT_PAGE_CHARS: usize = 6000;
const USER_AGENT: &str = "LessonsAgent/1.0";

/// Arguments for web search
#[derive(Deserialize, JsonSchema)]
pub struct SearchWebArgs {
    /// Search query
    pub query: String,
    /// Maximum number of results (default: 5, at most 10)
    pub max_results: Option<u32>,
}

/// Search the web for information
#[tool(
    description = "Search the web and return high-signal snippets with titles and URLs (max_results <= 10)."
)]
pub async fn search_web(args: SearchWebArgs) -> ToolResult {
    if args.query.trim().is_empty() {
        return ToolResult::error("query must be provided.");
    }
    let max_results = clamp_results(args.max_results);
    tracing::debug!(query = %args.query, max_results, "search_web");

    let client = match search_client() {
        Ok(c) => c,
        Err(e) => return ToolResult::error(e.to_string()),
    };

    match client.search(&args.query, max_results as usize).await {
        Ok(results) => ToolResult::success(json!({
            "query": args.query,
            "results": results
        })),
        Err(e) => ToolResult::error(e.to_string()),
    }
}

/// Valyu client configured from the loaded settings, like the pipeline's own client.
fn search_client() -> Result<ValyuSearchClient> {
    let settings = LessonSettings::load()?;
    ValyuSearchClient::from_env(&settings.search)
}

fn clamp_results(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_SEARCH_RESULTS)
        .clamp(1, MAX_SEARCH_RESULTS)
}

/// Arguments for fetching a web page
#[derive(Deserialize, JsonSchema)]
pub struct FetchWebPageArgs {
    /// Absolute http(s) URL of the page
    pub url: String,
    /// Maximum characters of text to return (default: 6000)
    pub max_chars: Option<usize>,
}

/// Download a page and reduce it to plain text
#[tool(description = "Download a web page and return its visible text, truncated to max_chars.")]
pub async fn fetch_web_page(args: FetchWebPageArgs) -> ToolResult {
    if args.url.trim().is_empty() {
        return ToolResult::error("url must be provided.");
    }
    let max_chars = args.max_chars.unwrap_or(DEFAULT_PAGE_CHARS);

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build();
    let client = match client {
        Ok(c) => c,
        Err(e) => return ToolResult::error(format!("Failed to create HTTP client: {}", e)),
    };

    let response = match client.get(&args.url).send().await {
        Ok(r) => r,
        Err(e) => return ToolResult::error(format!("Failed to fetch '{}': {}", args.url, e)),
    };
    if let Err(e) = response.error_for_status_ref() {
        return ToolResult::error(format!("Failed to fetch '{}': {}", args.url, e));
    }

    match response.text().await {
        Ok(html) => {
            let content = truncate(&strip_html(&html), max_chars);
            tracing::debug!(url = %args.url, chars = content.chars().count(), "fetch_web_page");
            ToolResult::success(json!({
                "url": args.url,
                "content": content
            }))
        }
        Err(e) => ToolResult::error(format!("Failed to read '{}': {}", args.url, e)),
    }
}
