mod support;

use arag_ai::answer::Answerer;
use arag_ai::evidence::EvidenceStore;
use arag_ai::guardrails::FALLBACK_ANSWER;
use arag_ai::index::{MemoryIndex, VectorIndex};
use arag_ai::pipeline::{IngestSummary, Pipeline, QueryPhase, QueryState};
use arag_ai::router::{RouteDecision, Router};
use arag_ai::websearch::WebEvidenceProvider;
use arag_core::chunking::{RecursiveSplitter, SplitterConfig};
use arag_core::domain::{Document, SourceKind};
use pretty_assertions::assert_eq;
use serde_json::json;

use support::{ScriptedLlm, StaticSearch, WordHashEmbedder};

fn pipeline<'a>(
    index: &'a MemoryIndex,
    embedder: &'a WordHashEmbedder,
    llm: &'a ScriptedLlm,
    search: &'a StaticSearch,
) -> Pipeline<'a> {
    Pipeline::new(
        Router::new(llm, "router"),
        EvidenceStore::new(index, embedder, "embed"),
        WebEvidenceProvider::new(search),
        Answerer::new(llm, "answer"),
    )
}

fn no_results() -> StaticSearch {
    StaticSearch::new(json!({"results": []}))
}

#[test]
fn long_document_ingests_once_with_overlapping_chunks() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "AAAA.");
    let search = no_results();
    let p = pipeline(&index, &embedder, &llm, &search);

    let doc = Document::new("AAAA ".repeat(400), SourceKind::UserPdf, "a.pdf");
    assert_eq!(doc.content.chars().count(), 2000);

    let first = p.ingest(std::slice::from_ref(&doc)).expect("ingest");
    assert_eq!(first.documents, 1);
    assert!(first.chunks >= 2);
    assert_eq!(first.inserted, first.chunks);
    assert_eq!(first.skipped_existing, 0);

    let chunks = arag_core::chunking::split_documents(std::slice::from_ref(&doc));
    let tail: String = chunks[0]
        .text
        .chars()
        .rev()
        .take(99)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    assert!(chunks[1].text.starts_with(&tail));
    assert!(chunks.iter().all(|c| c.text.chars().count() <= 1500));

    let second = p.ingest(&[doc]).expect("re-ingest");
    assert_eq!(
        second,
        IngestSummary {
            documents: 1,
            chunks: first.chunks,
            inserted: 0,
            skipped_existing: first.chunks,
        }
    );
    assert_eq!(index.len().expect("len"), first.chunks);
}

#[test]
fn vectorstore_question_answers_from_stored_evidence() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "<think>check context</think>Planning and memory.");
    let search = no_results();
    let p = pipeline(&index, &embedder, &llm, &search);

    p.ingest(&[Document::new(
        "LLM agents rely on planning and memory.",
        SourceKind::DefaultSeed,
        "https://lilianweng.github.io/posts/2023-06-23-agent/",
    )])
    .expect("ingest");

    let resp = p.ask("What do LLM agents rely on?").expect("ask");
    assert_eq!(resp.route, RouteDecision::Vectorstore);
    assert_eq!(resp.answer, "Planning and memory.");
    assert_eq!(resp.evidence.len(), 1);
    assert_eq!(resp.evidence[0].content, "LLM agents rely on planning and memory.");
    assert!(resp.evidence[0].metadata.contains_key("score"));
    assert!(search.requests.borrow().is_empty());
}

#[test]
fn web_route_with_malformed_results_answers_fallback() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("web_search", "invented");
    let search = StaticSearch::new(json!({"unexpected": true}));
    let p = pipeline(&index, &embedder, &llm, &search);

    let resp = p.ask("What's the weather in Tokyo?").expect("ask");
    assert_eq!(resp.route, RouteDecision::WebSearch);
    assert!(resp.evidence.is_empty());
    assert_eq!(resp.answer, FALLBACK_ANSWER);
    assert_eq!(llm.generate_calls(), 0);
}

#[test]
fn step_advances_one_phase_at_a_time() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("web_search", "Sunny.");
    let search = StaticSearch::new(json!({
        "results": [{"url": "https://weather.example", "content": "Tokyo is sunny today."}]
    }));
    let p = pipeline(&index, &embedder, &llm, &search);

    let state = QueryState::new("Weather in Tokyo?");
    assert_eq!(state.phase, QueryPhase::Start);

    let state = p.step(state).expect("route");
    assert_eq!(state.phase, QueryPhase::Routed);
    assert_eq!(state.route, Some(RouteDecision::WebSearch));
    assert!(state.evidence.is_empty());

    let state = p.step(state).expect("gather");
    assert_eq!(state.phase, QueryPhase::EvidenceGathered);
    assert_eq!(state.evidence.len(), 1);
    assert_eq!(state.answer, None);

    let state = p.step(state).expect("generate");
    assert_eq!(state.phase, QueryPhase::Answered);
    assert_eq!(state.answer.as_deref(), Some("Sunny."));

    let err = p.step(state).expect_err("already answered");
    assert_eq!(err.code, "PIPELINE_STATE_INVALID");
}

#[test]
fn routed_state_without_route_is_rejected() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "");
    let search = no_results();
    let p = pipeline(&index, &embedder, &llm, &search);

    let mut state = QueryState::new("q");
    state.phase = QueryPhase::Routed;
    assert_eq!(p.step(state).expect_err("no route").code, "PIPELINE_STATE_INVALID");
}

#[test]
fn empty_question_is_rejected_before_routing() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "");
    let search = no_results();
    let p = pipeline(&index, &embedder, &llm, &search);

    let err = p.ask("  \n").expect_err("empty");
    assert_eq!(err.code, "PIPELINE_QUESTION_EMPTY");
    assert!(llm.structured_calls.borrow().is_empty());
}

#[test]
fn retrieve_k_bounds_vectorstore_evidence() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "ok");
    let search = no_results();
    let p = pipeline(&index, &embedder, &llm, &search).with_retrieve_k(2);

    let docs: Vec<Document> = (0..5)
        .map(|i| Document::new(format!("agent note number {i}"), SourceKind::UserUrl, format!("u{i}")))
        .collect();
    assert_eq!(p.ingest(&docs).expect("ingest").inserted, 5);

    let evidence = p
        .gather(RouteDecision::Vectorstore, "agent note")
        .expect("gather");
    assert_eq!(evidence.len(), 2);
}

#[test]
fn ingest_uses_the_configured_splitter() {
    let index = MemoryIndex::new();
    let embedder = WordHashEmbedder;
    let llm = ScriptedLlm::routes_to("vectorstore", "ok");
    let search = no_results();
    let splitter = RecursiveSplitter::new(SplitterConfig {
        chunk_size: 200,
        chunk_overlap: 20,
        ..SplitterConfig::default()
    })
    .expect("splitter");
    let p = pipeline(&index, &embedder, &llm, &search).with_splitter(splitter);

    let words: String = (0..400).map(|i| format!("w{i:03} ")).collect();
    let summary = p
        .ingest(&[Document::new(words, SourceKind::UserPdf, "a.pdf")])
        .expect("ingest");
    // 2000 chars in 200-char windows that share 20 chars.
    assert!(summary.chunks >= 10, "got {} chunks", summary.chunks);
    assert_eq!(summary.inserted, summary.chunks);
    assert_eq!(index.len().expect("len"), summary.chunks);
}
