use std::collections::BTreeSet;

use arag_core::domain::Metadata;
use arag_core::error::AppError;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod similarity;
pub mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

/// A stored chunk: text, metadata and embedding, keyed by fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    pub fingerprint: String,
    pub text: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecord {
    pub fingerprint: String,
    pub text: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Vector index boundary used by the evidence store.
///
/// Implementations must make `insert_if_absent` atomic per fingerprint: two
/// concurrent inserts of the same fingerprint store exactly one record.
pub trait VectorIndex {
    /// The subset of `candidates` already stored. Exact, not sampled.
    fn known_fingerprints(&self, candidates: &[String]) -> Result<BTreeSet<String>, AppError>;

    /// Returns `true` when the record was stored, `false` when the fingerprint already existed.
    fn insert_if_absent(&self, record: &IndexRecord) -> Result<bool, AppError>;

    /// Top `k` records by cosine similarity, best first.
    fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>, AppError>;

    fn len(&self) -> Result<usize, AppError>;

    fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}

/// Brute-force cosine ranking shared by the index implementations.
///
/// Ties order by fingerprint ascending. Zero-norm vectors are skipped; a
/// dimension mismatch is an error.
pub(crate) fn rank<I>(query: &[f32], records: I, k: usize) -> Result<Vec<ScoredRecord>, AppError>
where
    I: IntoIterator<Item = IndexRecord>,
{
    if k == 0 {
        return Ok(Vec::new());
    }
    let qnorm = similarity::l2_norm(query);
    if qnorm == 0.0 {
        return Err(AppError::new(
            "RETRIEVAL_FAILED",
            "Query embedding norm is zero",
        ));
    }

    let mut hits: Vec<ScoredRecord> = Vec::new();
    for rec in records {
        if rec.embedding.len() != query.len() {
            return Err(AppError::new(
                "RETRIEVAL_FAILED",
                "Stored embedding dims do not match query dims",
            )
            .with_details(format!(
                "fingerprint={}; expected={}; got={}",
                rec.fingerprint,
                query.len(),
                rec.embedding.len()
            )));
        }
        let vnorm = similarity::l2_norm(&rec.embedding);
        if vnorm == 0.0 {
            continue;
        }
        let score = similarity::cosine_similarity(query, &rec.embedding, qnorm, vnorm);
        hits.push(ScoredRecord {
            fingerprint: rec.fingerprint,
            text: rec.text,
            metadata: rec.metadata,
            score,
        });
    }

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.fingerprint.cmp(&b.fingerprint))
    });
    hits.truncate(k);
    Ok(hits)
}
