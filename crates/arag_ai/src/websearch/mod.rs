use arag_core::domain::{Document, SourceKind};
use arag_core::error::AppError;
use serde_json::Value;

pub mod tavily;

pub use tavily::TavilyClient;

pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const PROVIDER_NAME: &str = "tavily";

/// Raw search API boundary. Returns the provider's JSON response untouched.
pub trait SearchApi {
    fn search(&self, query: &str, max_results: usize) -> Result<Value, AppError>;
}

/// Turns live search results into evidence documents.
pub struct WebEvidenceProvider<'a> {
    api: &'a dyn SearchApi,
    max_results: usize,
}

impl<'a> WebEvidenceProvider<'a> {
    pub fn new(api: &'a dyn SearchApi) -> Self {
        Self {
            api,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn search(&self, question: &str) -> Result<Vec<Document>, AppError> {
        let raw = self.api.search(question, self.max_results)?;
        let docs = parse_search_results(&raw);
        tracing::info!(results = docs.len(), "web search complete");
        Ok(docs)
    }
}

/// Extract `results[*].content` as `web_result` documents.
///
/// A response without a `results` array yields no documents. Items without
/// textual content are skipped.
pub fn parse_search_results(raw: &Value) -> Vec<Document> {
    let Some(items) = raw.get("results").and_then(|v| v.as_array()) else {
        tracing::warn!(response = %raw, "unexpected search response format");
        return Vec::new();
    };

    let mut out = Vec::new();
    for item in items {
        let Some(content) = item.get("content").and_then(|v| v.as_str()) else {
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }
        let origin = item
            .get("url")
            .and_then(|v| v.as_str())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(PROVIDER_NAME);
        let mut doc = Document::new(content, SourceKind::WebResult, origin).with_meta("url", origin);
        if let Some(title) = item.get("title").and_then(|v| v.as_str()) {
            doc = doc.with_meta("title", title);
        }
        if let Some(score) = item.get("score").and_then(|v| v.as_f64()) {
            doc = doc.with_meta("score", format!("{score:.4}"));
        }
        out.push(doc);
    }
    out
}
