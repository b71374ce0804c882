use std::time::Duration;

use arag_core::error::AppError;

/// Connection details for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !is_loopback_base_url(&base_url) {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url).timeout(Duration::from_millis(800)).call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(AppError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}

// Accepts `http://127.0.0.1` with an optional explicit port in 1..=65535 and nothing else.
fn is_loopback_base_url(base_url: &str) -> bool {
    match base_url.strip_prefix("http://127.0.0.1") {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(':')
            .filter(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
            .and_then(|port| port.parse::<u16>().ok())
            .map_or(false, |port| port != 0),
        None => false,
    }
}
