use std::collections::BTreeSet;

use arag_core::domain::{Chunk, SourceKind, META_ORDINAL, META_ORIGIN, META_SOURCE};
use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::index::{IndexRecord, ScoredRecord, VectorIndex};

pub const DEFAULT_RETRIEVE_K: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Content-addressed evidence persistence over an embedder and a vector index.
pub struct EvidenceStore<'a> {
    index: &'a dyn VectorIndex,
    embedder: &'a dyn Embedder,
    model: String,
}

impl<'a> EvidenceStore<'a> {
    pub fn new(index: &'a dyn VectorIndex, embedder: &'a dyn Embedder, model: impl Into<String>) -> Self {
        Self {
            index,
            embedder,
            model: model.into(),
        }
    }

    /// Embed and store every chunk whose fingerprint is not stored yet.
    ///
    /// Returns exactly the chunks that were inserted. A failed existence check
    /// is logged and treated as "nothing known"; the conditional insert still
    /// prevents duplicates. Embedding and insert failures are returned.
    pub fn upsert(&self, chunks: &[Chunk]) -> Result<Vec<Chunk>, AppError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let candidates: Vec<String> = chunks.iter().map(|c| c.fingerprint.clone()).collect();
        let known = match self.index.known_fingerprints(&candidates) {
            Ok(known) => known,
            Err(e) => {
                tracing::warn!(error = %e, "existence check failed; attempting to insert all chunks");
                BTreeSet::new()
            }
        };

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let fresh: Vec<&Chunk> = chunks
            .iter()
            .filter(|c| !known.contains(&c.fingerprint) && seen.insert(c.fingerprint.as_str()))
            .collect();
        if fresh.is_empty() {
            tracing::info!(chunks = chunks.len(), "all chunks already stored; nothing to insert");
            return Ok(Vec::new());
        }

        let mut inserted = Vec::new();
        for chunk in fresh {
            let embedding = self.embedder.embed(&self.model, &chunk.text).map_err(|e| {
                AppError::new("EMBEDDINGS_FAILED", "Failed to compute chunk embedding")
                    .with_details(format!("fingerprint={}; err={}", chunk.fingerprint, e))
                    .with_retryable(e.retryable)
            })?;
            let record = IndexRecord {
                fingerprint: chunk.fingerprint.clone(),
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                embedding,
            };
            if self.index.insert_if_absent(&record)? {
                inserted.push(chunk.clone());
            } else {
                tracing::debug!(fingerprint = %chunk.fingerprint, "chunk stored concurrently; skipped");
            }
        }

        tracing::info!(
            inserted = inserted.len(),
            skipped = chunks.len() - inserted.len(),
            "stored new chunks"
        );
        Ok(inserted)
    }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>, AppError> {
        Ok(self
            .retrieve_scored(query, k)?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }

    /// Most similar stored chunks with their cosine scores, best first, at most `k`.
    pub fn retrieve_scored(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AppError> {
        let q = query.trim();
        if q.is_empty() {
            return Err(AppError::new(
                "RETRIEVAL_FAILED",
                "Query must not be empty",
            ));
        }

        let qv = self.embedder.embed(&self.model, q)?;
        let hits = self.index.similarity_search(&qv, k)?;
        tracing::debug!(hits = hits.len(), k, "similarity search complete");
        hits.into_iter().map(retrieved_from_hit).collect()
    }
}

fn retrieved_from_hit(hit: ScoredRecord) -> Result<RetrievedChunk, AppError> {
    let invalid = |what: &str| {
        AppError::new("STORE_RECORD_INVALID", "Stored record metadata is incomplete")
            .with_details(format!("fingerprint={}; missing={what}", hit.fingerprint))
    };
    let source = hit
        .metadata
        .get(META_SOURCE)
        .and_then(|s| SourceKind::parse(s))
        .ok_or_else(|| invalid(META_SOURCE))?;
    let origin = hit
        .metadata
        .get(META_ORIGIN)
        .cloned()
        .ok_or_else(|| invalid(META_ORIGIN))?;
    let ordinal = hit
        .metadata
        .get(META_ORDINAL)
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| invalid(META_ORDINAL))?;

    Ok(RetrievedChunk {
        score: hit.score,
        chunk: Chunk {
            text: hit.text,
            fingerprint: hit.fingerprint,
            source,
            origin,
            ordinal,
            metadata: hit.metadata,
        },
    })
}
