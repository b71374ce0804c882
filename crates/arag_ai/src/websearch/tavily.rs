use std::time::Duration;

use arag_core::error::AppError;
use serde::Serialize;
use serde_json::Value;

use super::SearchApi;

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Clone)]
pub struct TavilyClient {
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

impl TavilyClient {
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::new("CONFIG_MISSING", "Tavily API key is required")
                .with_details("key=TAVILY_API_KEY"));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl SearchApi for TavilyClient {
    fn search(&self, query: &str, max_results: usize) -> Result<Value, AppError> {
        let body = serde_json::to_value(SearchRequest {
            query,
            max_results,
            search_depth: "basic",
        })
        .map_err(|e| {
            AppError::new("WEB_SEARCH_FAILED", "Failed to encode search request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&self.endpoint)
            .timeout(Duration::from_secs(30))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body);

        match resp {
            Ok(r) => {
                let raw = r.into_string().map_err(|e| {
                    AppError::new("WEB_SEARCH_FAILED", "Failed to read search response")
                        .with_details(e.to_string())
                        .with_retryable(true)
                })?;
                Ok(decode_response(&raw))
            }
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new("WEB_SEARCH_FAILED", "Search request failed")
                    .with_details(format!("status={status}; body={body}"))
                    .with_retryable(status == 429 || status >= 500))
            }
            Err(e) => Err(AppError::new("WEB_SEARCH_FAILED", "Failed to call search API")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}

// A body that is not JSON carries no results; the caller sees empty evidence.
fn decode_response(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "search response is not JSON");
        Value::Null
    })
}
