use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";
pub const DEFAULT_INDEX_PATH: &str = "arag_index.sqlite";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_ROUTER_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_ANSWER_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_RETRIEVE_K: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Groq,
    Ollama,
}

/// Process configuration, read once at startup.
///
/// Every required credential is checked here so a misconfigured process fails
/// before doing any work rather than in the middle of a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub llm_provider: LlmProvider,
    pub groq_api_key: Option<String>,
    pub tavily_api_key: String,
    pub index_path: PathBuf,
    pub ollama_base_url: String,
    pub embed_model: String,
    pub router_model: String,
    pub answer_model: String,
    pub retrieve_k: usize,
    pub user_agent: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                AppError::new("CONFIG_MISSING", "Required configuration value is not set")
                    .with_details(format!("key={key}"))
            })
        };

        let llm_provider = match get("ARAG_LLM_PROVIDER").as_deref() {
            None | Some("groq") => LlmProvider::Groq,
            Some("ollama") => LlmProvider::Ollama,
            Some(other) => {
                return Err(AppError::new(
                    "CONFIG_INVALID",
                    "ARAG_LLM_PROVIDER must be groq or ollama",
                )
                .with_details(format!("value={other}")))
            }
        };
        let groq_api_key = match llm_provider {
            LlmProvider::Groq => Some(require("GROQ_API_KEY")?),
            LlmProvider::Ollama => get("GROQ_API_KEY"),
        };
        let tavily_api_key = require("TAVILY_API_KEY")?;

        let retrieve_k = match get("ARAG_RETRIEVE_K") {
            None => DEFAULT_RETRIEVE_K,
            Some(raw) => match raw.parse::<usize>() {
                Ok(k) if k > 0 => k,
                _ => {
                    return Err(AppError::new(
                        "CONFIG_INVALID",
                        "ARAG_RETRIEVE_K must be a positive integer",
                    )
                    .with_details(format!("value={raw}")))
                }
            },
        };

        Ok(Self {
            llm_provider,
            groq_api_key,
            tavily_api_key,
            index_path: PathBuf::from(
                get("ARAG_INDEX_PATH").unwrap_or_else(|| DEFAULT_INDEX_PATH.to_string()),
            ),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            embed_model: get("ARAG_EMBED_MODEL").unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            router_model: get("ARAG_ROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_ROUTER_MODEL.to_string()),
            answer_model: get("ARAG_ANSWER_MODEL")
                .unwrap_or_else(|| DEFAULT_ANSWER_MODEL.to_string()),
            retrieve_k,
            user_agent: get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

// Keys are never written to logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("llm_provider", &self.llm_provider)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<redacted>"))
            .field("tavily_api_key", &"<redacted>")
            .field("index_path", &self.index_path)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("embed_model", &self.embed_model)
            .field("router_model", &self.router_model)
            .field("answer_model", &self.answer_model)
            .field("retrieve_k", &self.retrieve_k)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
