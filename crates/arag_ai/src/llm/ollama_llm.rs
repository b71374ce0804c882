use std::time::Duration;

use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    fn call(&self, req: GenerateRequest<'_>) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let resp = ureq::post(&url)
            .timeout(Duration::from_secs(60))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("LLM_GENERATE_FAILED", "Failed to encode generate request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) => {
                let v: GenerateResponse = r.into_json().map_err(|e| {
                    AppError::new("LLM_GENERATE_FAILED", "Failed to decode generate response")
                        .with_details(e.to_string())
                })?;
                if v.response.trim().is_empty() {
                    return Err(AppError::new(
                        "LLM_GENERATE_FAILED",
                        "Model response was empty",
                    ));
                }
                Ok(v.response)
            }
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new("LLM_GENERATE_FAILED", "Generate request failed")
                    .with_details(format!("status={status}; body={body}"))
                    .with_retryable(status == 429 || status >= 500))
            }
            Err(e) => Err(
                AppError::new("LLM_GENERATE_FAILED", "Failed to call generate endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        self.call(GenerateRequest {
            model,
            prompt,
            system: None,
            format: None,
            stream: false,
        })
    }

    fn generate_structured(&self, model: &str, system: &str, input: &str) -> Result<String, AppError> {
        self.call(GenerateRequest {
            model,
            prompt: input,
            system: Some(system),
            format: Some("json"),
            stream: false,
        })
    }
}
