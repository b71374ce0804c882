use std::fmt;

use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::llm::Llm;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    Vectorstore,
    WebSearch,
}

impl RouteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Vectorstore => "vectorstore",
            RouteDecision::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ROUTER_SYSTEM_PROMPT: &str = r#"You are an expert router in a retrieval-augmented generation (RAG) system.

Route user questions to the appropriate datasource.

- Use the vectorstore if the question relates to the documents in it, which include:
  - Topics like LLM agents, prompt engineering, adversarial attacks
  - Any custom URLs or PDFs recently added by the user

- Use Web Search if the question is about unrelated topics.

Always prefer the vectorstore if the user's documents were recently added.

Respond with a JSON object only, of the form {"datasource": "vectorstore"} or {"datasource": "web_search"}."#;

#[derive(Debug, Deserialize)]
struct RouteQuery {
    datasource: RouteDecision,
}

/// Chooses the evidence source for a question. Stateless.
pub struct Router<'a> {
    llm: &'a dyn Llm,
    model: String,
}

impl<'a> Router<'a> {
    pub fn new(llm: &'a dyn Llm, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Ask the model for a structured decision.
    ///
    /// Output that does not parse routes to web search. A failed model call is
    /// returned as an error.
    pub fn decide(&self, question: &str) -> Result<RouteDecision, AppError> {
        let raw = self
            .llm
            .generate_structured(&self.model, ROUTER_SYSTEM_PROMPT, question)?;
        let decision = match parse_route_decision(&raw) {
            Some(d) => d,
            None => {
                tracing::warn!(output = %raw, "router output not understood; defaulting to web_search");
                RouteDecision::WebSearch
            }
        };
        tracing::info!(route = %decision, "routing decision");
        Ok(decision)
    }
}

/// Parse `{"datasource": "..."}`, tolerating code fences and text around the object.
pub fn parse_route_decision(raw: &str) -> Option<RouteDecision> {
    let trimmed = raw.trim();
    if let Ok(q) = serde_json::from_str::<RouteQuery>(trimmed) {
        return Some(q.datasource);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<RouteQuery>(&trimmed[start..=end])
        .ok()
        .map(|q| q.datasource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_wrapped_json() {
        assert_eq!(
            parse_route_decision(r#"{"datasource":"vectorstore"}"#),
            Some(RouteDecision::Vectorstore)
        );
        assert_eq!(
            parse_route_decision("```json\n{\"datasource\": \"web_search\"}\n```"),
            Some(RouteDecision::WebSearch)
        );
    }

    #[test]
    fn rejects_unknown_or_missing_datasource() {
        assert_eq!(parse_route_decision(r#"{"datasource":"wiki"}"#), None);
        assert_eq!(parse_route_decision(r#"{"route":"vectorstore"}"#), None);
        assert_eq!(parse_route_decision("vectorstore"), None);
        assert_eq!(parse_route_decision("} {"), None);
    }

    #[test]
    fn decision_serializes_as_wire_names() {
        assert_eq!(
            serde_json::to_string(&RouteDecision::WebSearch).expect("json"),
            "\"web_search\""
        );
        assert_eq!(RouteDecision::Vectorstore.to_string(), "vectorstore");
    }
}
