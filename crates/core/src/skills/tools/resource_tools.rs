//! # Resource Tools
//!
//! Loads local reference documents (text, markdown, PDF) for the research agent.

use radkit::macros::tool;
use radkit::tools::ToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Directory searched for relative paths after the working directory
pub const RESOURCE_DIR: &str = "resources";

/// Arguments for loading a local resource
#[derive(Deserialize, JsonSchema)]
pub struct LoadLocalResourceArgs {
    /// Absolute path, or a path relative to the working directory or `resources/`
    pub path: String,
}

/// Load a local markdown, text or PDF document
#[tool(
    description = "Load a local markdown/text/PDF document (absolute path, or relative to the working directory or resources/)."
)]
pub async fn load_local_resource(args: LoadLocalResourceArgs) -> ToolResult {
    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match load_resource(&base, &args.path).await {
        Ok(value) => ToolResult::success(value),
        Err(message) => ToolResult::error(message),
    }
}

/// Resolve `path` against `base` and `base/resources`.
pub fn resolve_resource_path(base: &Path, path: &str) -> Result<PathBuf, String> {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        return Ok(candidate);
    }
    let direct = base.join(path);
    if direct.exists() {
        return Ok(direct);
    }
    let resource = base.join(RESOURCE_DIR).join(path);
    if resource.exists() {
        return Ok(resource);
    }
    Err(format!("Could not locate document: {}", path))
}

async fn load_resource(base: &Path, path: &str) -> Result<Value, String> {
    if path.trim().is_empty() {
        return Err("path must be provided.".to_string());
    }
    let resolved = resolve_resource_path(base, path)?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|_| format!("Document not found: {}", resolved.display()))?;
    if metadata.is_dir() {
        return Err(format!(
            "Expected a file but received a directory: {}",
            resolved.display()
        ));
    }

    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    tracing::debug!(path = %resolved.display(), bytes = metadata.len(), "load_local_resource");

    let is_pdf = resolved
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let (document_type, content) = if is_pdf {
        let text = extract_pdf_text(&bytes)
            .map_err(|e| format!("Failed to parse PDF '{}': {}", resolved.display(), e))?;
        ("pdf", text)
    } else {
        ("text", String::from_utf8_lossy(&bytes).into_owned())
    };

    Ok(json!({
        "path": resolved.display().to_string(),
        "document_type": document_type,
        "content": content,
        "size_bytes": metadata.len()
    }))
}

/// Page texts joined by blank lines; pages without extractable text are skipped.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let document = lopdf::Document::load_mem(bytes)?;
    let pages: Vec<String> = document
        .get_pages()
        .keys()
        .filter_map(|page| document.extract_text(&[*page]).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    Ok(pages.join("\n\n"))
}
