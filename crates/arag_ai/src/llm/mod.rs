use arag_core::error::AppError;

/// Language model boundary.
///
/// `generate` is a single free-text completion. `generate_structured` runs the
/// model in JSON mode under a system instruction and returns the raw JSON text;
/// callers own parsing and fallbacks.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;

    fn generate_structured(&self, model: &str, system: &str, input: &str) -> Result<String, AppError>;
}

pub mod groq_llm;
pub mod ollama_llm;

pub use groq_llm::GroqLlm;
pub use ollama_llm::OllamaLlm;
