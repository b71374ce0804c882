use std::time::Duration;

use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;

pub const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq hosted models through the OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct GroqLlm {
    api_key: String,
    endpoint: String,
}

impl GroqLlm {
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::new("CONFIG_MISSING", "Groq API key is required")
                .with_details("key=GROQ_API_KEY"));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            endpoint: GROQ_CHAT_COMPLETIONS_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn chat(&self, req: &ChatRequest<'_>) -> Result<String, AppError> {
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("LLM_GENERATE_FAILED", "Failed to encode chat request")
                .with_details(e.to_string())
        })?;
        let resp = ureq::post(&self.endpoint)
            .timeout(Duration::from_secs(60))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body);

        match resp {
            Ok(r) => {
                let raw = r.into_string().map_err(|e| {
                    AppError::new("LLM_GENERATE_FAILED", "Failed to read chat response")
                        .with_details(e.to_string())
                        .with_retryable(true)
                })?;
                parse_chat_response(&raw)
            }
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new("LLM_GENERATE_FAILED", "Chat request failed")
                    .with_details(format!("model={}; status={status}; body={body}", req.model))
                    .with_retryable(status == 429 || status >= 500))
            }
            Err(e) => Err(
                AppError::new("LLM_GENERATE_FAILED", "Failed to call chat endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn parse_chat_response(raw: &str) -> Result<String, AppError> {
    let v: ChatResponse = serde_json::from_str(raw).map_err(|e| {
        AppError::new("LLM_GENERATE_FAILED", "Failed to decode chat response")
            .with_details(e.to_string())
    })?;
    let content = v
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::new(
            "LLM_GENERATE_FAILED",
            "Model response was empty",
        ));
    }
    Ok(content)
}

impl Llm for GroqLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        self.chat(&ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            response_format: None,
        })
    }

    fn generate_structured(&self, model: &str, system: &str, input: &str) -> Result<String, AppError> {
        self.chat(&ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: input,
                },
            ],
            temperature: 0.0,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        })
    }
}
