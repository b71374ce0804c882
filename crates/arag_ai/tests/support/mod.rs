#![allow(dead_code)]

use std::cell::RefCell;

use arag_ai::embeddings::Embedder;
use arag_ai::llm::Llm;
use arag_ai::websearch::SearchApi;
use arag_core::error::AppError;
use serde_json::Value;

pub const DIMS: usize = 64;

/// Deterministic bag-of-words embedder. Texts sharing words score higher.
pub struct WordHashEmbedder;

impl Embedder for WordHashEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let mut v = vec![0.0f32; DIMS];
        for word in input
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % (DIMS - 1)] += 1.0;
        }
        // Bias dimension keeps every vector non-zero.
        v[DIMS - 1] = 0.1;
        Ok(v)
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        Err(AppError::new("EMBEDDINGS_FAILED", "embedding backend down").with_retryable(true))
    }
}

/// Returns fixed outputs and records every call.
pub struct ScriptedLlm {
    pub route_output: String,
    pub answer_output: String,
    pub prompts: RefCell<Vec<String>>,
    pub structured_calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn new(route_output: &str, answer_output: &str) -> Self {
        Self {
            route_output: route_output.to_string(),
            answer_output: answer_output.to_string(),
            prompts: RefCell::new(Vec::new()),
            structured_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn routes_to(datasource: &str, answer_output: &str) -> Self {
        Self::new(&format!(r#"{{"datasource": "{datasource}"}}"#), answer_output)
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl Llm for ScriptedLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer_output.clone())
    }

    fn generate_structured(&self, _model: &str, system: &str, input: &str) -> Result<String, AppError> {
        self.structured_calls
            .borrow_mut()
            .push((system.to_string(), input.to_string()));
        Ok(self.route_output.clone())
    }
}

pub struct FailingLlm;

impl Llm for FailingLlm {
    fn generate(&self, model: &str, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::new("LLM_GENERATE_FAILED", "Chat request failed")
            .with_details(format!("model={model}; status=503"))
            .with_retryable(true))
    }

    fn generate_structured(&self, model: &str, _system: &str, _input: &str) -> Result<String, AppError> {
        self.generate(model, "")
    }
}

/// Serves one canned response and records the requested result count.
pub struct StaticSearch {
    pub response: Value,
    pub requests: RefCell<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn new(response: Value) -> Self {
        Self {
            response,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl SearchApi for StaticSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Value, AppError> {
        self.requests
            .borrow_mut()
            .push((query.to_string(), max_results));
        Ok(self.response.clone())
    }
}

pub struct DownSearch;

impl SearchApi for DownSearch {
    fn search(&self, _query: &str, _max_results: usize) -> Result<Value, AppError> {
        Err(AppError::new("WEB_SEARCH_FAILED", "Failed to call search API").with_retryable(true))
    }
}
