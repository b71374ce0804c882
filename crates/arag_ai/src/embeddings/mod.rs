use arag_core::error::AppError;

/// Text to fixed-length vector. Must be deterministic for identical input.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;

pub use ollama_embed::OllamaEmbedder;
