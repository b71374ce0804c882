pub mod answer;
pub mod embeddings;
pub mod evidence;
pub mod guardrails;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod router;
pub mod websearch;
