use arag_core::chunking::{split_documents_with, RecursiveSplitter};
use arag_core::domain::Document;
use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::answer::Answerer;
use crate::evidence::{EvidenceStore, RetrievedChunk, DEFAULT_RETRIEVE_K};
use crate::router::{RouteDecision, Router};
use crate::websearch::WebEvidenceProvider;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryPhase {
    Start,
    Routed,
    EvidenceGathered,
    Answered,
}

/// Per-request state. Each phase fills in one more field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryState {
    pub question: String,
    pub route: Option<RouteDecision>,
    pub evidence: Vec<Document>,
    pub answer: Option<String>,
    pub phase: QueryPhase,
}

impl QueryState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            route: None,
            evidence: Vec::new(),
            answer: None,
            phase: QueryPhase::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IngestSummary {
    pub documents: usize,
    pub chunks: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    pub route: RouteDecision,
    pub evidence: Vec<Document>,
}

/// Ingestion and the route -> gather -> generate query cycle.
///
/// Every collaborator is borrowed; the pipeline owns no clients.
pub struct Pipeline<'a> {
    router: Router<'a>,
    store: EvidenceStore<'a>,
    web: WebEvidenceProvider<'a>,
    answerer: Answerer<'a>,
    splitter: RecursiveSplitter,
    retrieve_k: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        router: Router<'a>,
        store: EvidenceStore<'a>,
        web: WebEvidenceProvider<'a>,
        answerer: Answerer<'a>,
    ) -> Self {
        Self {
            router,
            store,
            web,
            answerer,
            splitter: RecursiveSplitter::default(),
            retrieve_k: DEFAULT_RETRIEVE_K,
        }
    }

    pub fn with_retrieve_k(mut self, k: usize) -> Self {
        self.retrieve_k = k;
        self
    }

    pub fn with_splitter(mut self, splitter: RecursiveSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Split, fingerprint and store documents. Re-ingesting the same content inserts nothing.
    pub fn ingest(&self, documents: &[Document]) -> Result<IngestSummary, AppError> {
        let chunks = split_documents_with(&self.splitter, documents);
        let inserted = self.store.upsert(&chunks)?;
        let summary = IngestSummary {
            documents: documents.len(),
            chunks: chunks.len(),
            inserted: inserted.len(),
            skipped_existing: chunks.len() - inserted.len(),
        };
        tracing::info!(
            documents = summary.documents,
            chunks = summary.chunks,
            inserted = summary.inserted,
            skipped = summary.skipped_existing,
            "ingestion complete"
        );
        Ok(summary)
    }

    pub fn route(&self, question: &str) -> Result<RouteDecision, AppError> {
        self.router.decide(question)
    }

    pub fn gather(&self, route: RouteDecision, question: &str) -> Result<Vec<Document>, AppError> {
        match route {
            RouteDecision::Vectorstore => {
                let hits = self.store.retrieve_scored(question, self.retrieve_k)?;
                tracing::info!(hits = hits.len(), "retrieved stored evidence");
                Ok(hits.into_iter().map(document_from_hit).collect())
            }
            RouteDecision::WebSearch => self.web.search(question),
        }
    }

    pub fn generate(&self, question: &str, evidence: &[Document]) -> Result<String, AppError> {
        self.answerer.generate(question, evidence)
    }

    /// Advance `state` by exactly one phase.
    pub fn step(&self, mut state: QueryState) -> Result<QueryState, AppError> {
        match state.phase {
            QueryPhase::Start => {
                state.route = Some(self.route(&state.question)?);
                state.phase = QueryPhase::Routed;
            }
            QueryPhase::Routed => {
                let route = state.route.ok_or_else(|| {
                    AppError::new("PIPELINE_STATE_INVALID", "Routed state has no route")
                })?;
                state.evidence = self.gather(route, &state.question)?;
                state.phase = QueryPhase::EvidenceGathered;
            }
            QueryPhase::EvidenceGathered => {
                state.answer = Some(self.generate(&state.question, &state.evidence)?);
                state.phase = QueryPhase::Answered;
            }
            QueryPhase::Answered => {
                return Err(AppError::new(
                    "PIPELINE_STATE_INVALID",
                    "Query is already answered",
                ));
            }
        }
        Ok(state)
    }

    pub fn ask(&self, question: &str) -> Result<AskResponse, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::new(
                "PIPELINE_QUESTION_EMPTY",
                "Question must not be empty",
            ));
        }

        let mut state = QueryState::new(question);
        while state.phase != QueryPhase::Answered {
            state = self.step(state)?;
        }

        match (state.answer, state.route) {
            (Some(answer), Some(route)) => Ok(AskResponse {
                answer,
                route,
                evidence: state.evidence,
            }),
            _ => Err(AppError::new(
                "PIPELINE_STATE_INVALID",
                "Answered state is missing its answer or route",
            )),
        }
    }
}

fn document_from_hit(hit: RetrievedChunk) -> Document {
    let score = format!("{:.4}", hit.score);
    hit.chunk.into_document().with_meta("score", score)
}
