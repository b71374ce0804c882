use arag_core::domain::Document;
use arag_core::error::AppError;

use crate::guardrails::{strip_reasoning, FALLBACK_ANSWER};
use crate::llm::Llm;

pub mod prompts;

/// Produces answers grounded strictly in the supplied evidence.
pub struct Answerer<'a> {
    llm: &'a dyn Llm,
    model: String,
}

impl<'a> Answerer<'a> {
    pub fn new(llm: &'a dyn Llm, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// One model call over the evidence joined by newline, in the given order.
    ///
    /// With no usable evidence the fallback answer is returned without calling
    /// the model. Generation failures are returned as errors, never as text.
    pub fn generate(&self, question: &str, evidence: &[Document]) -> Result<String, AppError> {
        let context = build_context(evidence);
        if context.trim().is_empty() {
            tracing::info!("no evidence; returning fallback answer");
            return Ok(FALLBACK_ANSWER.to_string());
        }

        let prompt = prompts::grounded_answer_prompt(&context, question);
        let raw = self.llm.generate(&self.model, &prompt)?;
        let answer = strip_reasoning(&raw);
        if answer.is_empty() {
            return Err(AppError::new(
                "LLM_GENERATE_FAILED",
                "Model returned no answer outside its reasoning block",
            )
            .with_details(format!("model={}", self.model)));
        }
        tracing::debug!(model = %self.model, evidence = evidence.len(), "generated answer");
        Ok(answer)
    }
}

pub fn build_context(evidence: &[Document]) -> String {
    evidence
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
