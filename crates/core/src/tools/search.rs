//! # Search - Web Search Client
//!
//! The `SearchProvider` seam consumed by the pipeline, the record shape it
//! returns, and the Valyu deep-search client used in production.

use super::sanitize::{strip_html, truncate};
use crate::config::SearchSettings;
use crate::error::{LessonError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Environment variable holding the Valyu API key
pub const VALYU_API_KEY_VAR: &str = "VALYU_API_KEY";

/// Environment variable overriding the Valyu base URL
pub const VALYU_BASE_URL_VAR: &str = "VALYU_API_BASE_URL";

/// Public URL of the search provider itself (never recommended as a resource)
pub const SEARCH_PROVIDER_URL: &str = "https://valyu.ai";

const PROMPT_HINT_MAX_CHARS: usize = 400;

/// A single search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Short description suitable for seeding an image prompt
    #[serde(default)]
    pub image_prompt_hint: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_prompt_hint(mut self, hint: impl Into<String>) -> Self {
        self.image_prompt_hint = Some(hint.into());
        self
    }

    /// Map one raw Valyu result item into a `SearchResult`.
    pub fn from_valyu(item: &Value) -> Self {
        let text = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut summary = text("summary").or_else(|| text("snippet")).unwrap_or_default();
        if summary.is_empty() {
            if let Some(content) = text("content") {
                summary = strip_html(&content);
            }
        }
        let summary = summary.trim().to_string();

        let thumbnail_url = text("thumbnail_url").or_else(|| text("thumbnailUrl"));
        let image_url = text("image_url")
            .or_else(|| text("imageUrl"))
            .or_else(|| thumbnail_url.clone());

        let url = text("url");
        let title = text("title").or_else(|| url.clone());

        let hint_source = text("image_prompt")
            .or_else(|| Some(summary.clone()).filter(|s| !s.is_empty()))
            .or_else(|| title.clone());
        let image_prompt_hint = hint_source.map(|s| truncate(&s, PROMPT_HINT_MAX_CHARS));

        Self {
            title,
            url,
            summary,
            image_url,
            thumbnail_url,
            image_prompt_hint,
        }
    }
}

/// Search capability consumed by research fallback, bundle fallback and image enrichment
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return up to `max_results` ordered results for `query`.
    ///
    /// Implementations must return `LessonError::MissingCredential` when their
    /// access credential is absent.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Client for the Valyu deep-search API
#[derive(Debug, Clone)]
pub struct ValyuSearchClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl ValyuSearchClient {
    pub fn new(api_key: Option<String>, settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LessonError::search(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build a client from `VALYU_API_KEY` / `VALYU_API_BASE_URL`.
    ///
    /// A missing key is not an error here; it surfaces on the first search.
    pub fn from_env(settings: &SearchSettings) -> Result<Self> {
        let mut settings = settings.clone();
        if let Ok(base_url) = std::env::var(VALYU_BASE_URL_VAR) {
            if !base_url.trim().is_empty() {
                settings.base_url = base_url;
            }
        }
        Self::new(std::env::var(VALYU_API_KEY_VAR).ok(), &settings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LessonError::MissingCredential {
                var: VALYU_API_KEY_VAR.to_string(),
            })
    }
}

#[async_trait]
impl SearchProvider for ValyuSearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let api_key = self.api_key()?;
        let payload = json!({
            "query": query,
            "search_type": "all",
            "max_num_results": max_results,
            "is_tool_call": true,
        });

        tracing::debug!(query = %query, max_results, base_url = %self.base_url(), "Valyu search");

        let response = self
            .client
            .post(format!("{}/deepsearch", self.base_url()))
            .header("x-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LessonError::search(format!("Valyu request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LessonError::search(format!("Failed to read Valyu response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .filter(|e| !e.is_empty())
                .unwrap_or(body);
            return Err(LessonError::search(format!(
                "Valyu search failed ({}): {}",
                status.as_u16(),
                detail
            )));
        }

        parse_valyu_response(&body)
    }
}

/// Parse a Valyu deep-search response body.
pub fn parse_valyu_response(body: &str) -> Result<Vec<SearchResult>> {
    let data: Value = serde_json::from_str(body)?;
    if !data.get("success").and_then(Value::as_bool).unwrap_or(true) {
        let error = data
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(LessonError::search(format!("Valyu search error: {}", error)));
    }
    Ok(data
        .get("results")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(SearchResult::from_valyu).collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valyu_results() {
        let body = r#"{
            "results": [{
                "title": "Result A",
                "url": "https://example.com/a",
                "summary": "Summary A",
                "image_url": "https://example.com/a.png",
                "thumbnail_url": "https://example.com/thumb-a.png",
                "image_prompt": "Diagram of concept A"
            }]
        }"#;
        let results = parse_valyu_response(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title.as_deref(), Some("Result A"));
        assert_eq!(results[0].image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            results[0].image_prompt_hint.as_deref(),
            Some("Diagram of concept A")
        );
    }

    #[test]
    fn test_result_field_fallbacks() {
        let item = json!({
            "url": "https://example.com/b",
            "content": "<p>Vector <b>search</b> basics</p>",
            "thumbnailUrl": "https://example.com/b-thumb.png"
        });
        let result = SearchResult::from_valyu(&item);
        assert_eq!(result.title.as_deref(), Some("https://example.com/b"));
        assert_eq!(result.summary, "Vector search basics");
        assert_eq!(result.image_url.as_deref(), Some("https://example.com/b-thumb.png"));
        assert_eq!(result.thumbnail_url.as_deref(), Some("https://example.com/b-thumb.png"));
        assert_eq!(result.image_prompt_hint.as_deref(), Some("Vector search basics"));
    }

    #[test]
    fn test_unsuccessful_payload_is_an_error() {
        let err = parse_valyu_response(r#"{"success": false, "error": "quota"}"#).unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_missing_key_is_distinguishable() {
        let client = ValyuSearchClient::new(None, &SearchSettings::default()).unwrap();
        let err = client.search("rag", 3).await.unwrap_err();
        assert!(matches!(err, LessonError::MissingCredential { ref var } if var == VALYU_API_KEY_VAR));
    }
}
