use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use arag_core::error::AppError;

use super::{rank, IndexRecord, ScoredRecord, VectorIndex};

/// In-process index. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: Mutex<BTreeMap<String, IndexRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, IndexRecord>>, AppError> {
        self.records
            .lock()
            .map_err(|_| AppError::new("STORE_LOCK_POISONED", "Memory index lock poisoned"))
    }
}

impl VectorIndex for MemoryIndex {
    fn known_fingerprints(&self, candidates: &[String]) -> Result<BTreeSet<String>, AppError> {
        let records = self.lock()?;
        Ok(candidates
            .iter()
            .filter(|fp| records.contains_key(fp.as_str()))
            .cloned()
            .collect())
    }

    fn insert_if_absent(&self, record: &IndexRecord) -> Result<bool, AppError> {
        let mut records = self.lock()?;
        if let Some(existing) = records.values().next() {
            if existing.embedding.len() != record.embedding.len() {
                return Err(AppError::new(
                    "STORE_INSERT_FAILED",
                    "Embedding dimension mismatch across records",
                )
                .with_details(format!(
                    "expected={}; got={}; fingerprint={}",
                    existing.embedding.len(),
                    record.embedding.len(),
                    record.fingerprint
                )));
            }
        }
        if records.contains_key(&record.fingerprint) {
            return Ok(false);
        }
        records.insert(record.fingerprint.clone(), record.clone());
        Ok(true)
    }

    fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>, AppError> {
        let records = self.lock()?;
        rank(query, records.values().cloned(), k)
    }

    fn len(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.len())
    }
}
