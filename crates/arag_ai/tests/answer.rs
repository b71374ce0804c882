mod support;

use arag_ai::answer::Answerer;
use arag_ai::guardrails::FALLBACK_ANSWER;
use arag_core::domain::{Document, SourceKind};
use pretty_assertions::assert_eq;

use support::{FailingLlm, ScriptedLlm};

const MODEL: &str = "deepseek-r1-distill-llama-70b";

fn evidence() -> Vec<Document> {
    vec![
        Document::new("Agents combine planning, memory and tool use.", SourceKind::DefaultSeed, "a"),
        Document::new("Reflection lets agents refine past actions.", SourceKind::DefaultSeed, "b"),
    ]
}

#[test]
fn unrelated_question_gets_exact_refusal() {
    let llm = ScriptedLlm::new("", "  I don't know.\n");
    let answerer = Answerer::new(&llm, MODEL);
    let answer = answerer
        .generate("Who won the 1998 World Cup?", &evidence())
        .expect("generate");
    assert_eq!(answer, FALLBACK_ANSWER);
}

#[test]
fn prompt_contains_evidence_in_order_and_question() {
    let llm = ScriptedLlm::new("", "Planning, memory and tool use.");
    let answerer = Answerer::new(&llm, MODEL);
    answerer
        .generate("What do agents combine?", &evidence())
        .expect("generate");

    let prompts = llm.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(
        "Context:\nAgents combine planning, memory and tool use.\nReflection lets agents refine past actions.\n"
    ));
    assert!(prompts[0].contains("Question: What do agents combine?"));
}

#[test]
fn reasoning_block_is_removed() {
    let llm = ScriptedLlm::new(
        "",
        "<think>\nThe context lists planning, memory, tool use.\n</think>\n\nPlanning, memory and tool use.",
    );
    let answerer = Answerer::new(&llm, MODEL);
    let answer = answerer.generate("What do agents combine?", &evidence()).expect("generate");
    assert_eq!(answer, "Planning, memory and tool use.");
}

#[test]
fn empty_evidence_returns_fallback_without_calling_the_model() {
    let llm = ScriptedLlm::new("", "made up answer");
    let answerer = Answerer::new(&llm, MODEL);
    assert_eq!(answerer.generate("anything", &[]).expect("generate"), FALLBACK_ANSWER);
    assert_eq!(llm.generate_calls(), 0);
}

#[test]
fn model_failure_is_an_error_not_an_answer() {
    let answerer = Answerer::new(&FailingLlm, MODEL);
    let err = answerer.generate("anything", &evidence()).expect_err("should fail");
    assert_eq!(err.code, "LLM_GENERATE_FAILED");
}

#[test]
fn reasoning_only_output_is_an_error() {
    let llm = ScriptedLlm::new("", "<think>no conclusion</think>");
    let answerer = Answerer::new(&llm, MODEL);
    let err = answerer.generate("anything", &evidence()).expect_err("should fail");
    assert_eq!(err.code, "LLM_GENERATE_FAILED");
}
