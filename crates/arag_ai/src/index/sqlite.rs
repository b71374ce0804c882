use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use arag_core::db;
use arag_core::domain::Metadata;
use arag_core::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};

use super::{rank, IndexRecord, ScoredRecord, VectorIndex};

/// SQLite-backed vector index.
///
/// The fingerprint is the table's primary key and inserts use `INSERT OR IGNORE`,
/// so dedup holds even when two ingestion runs race on the same chunk.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let mut conn = db::open(path)?;
        db::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened evidence index");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let mut conn = db::open_in_memory()?;
        db::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::new("STORE_LOCK_POISONED", "Evidence index lock poisoned"))
    }

    fn read_all(conn: &Connection) -> Result<Vec<IndexRecord>, AppError> {
        let mut stmt = conn
            .prepare("SELECT fingerprint, text, metadata_json, embedding_json FROM evidence_records")
            .map_err(|e| {
                AppError::new("RETRIEVAL_FAILED", "Failed to query evidence records")
                    .with_details(e.to_string())
            })?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| {
                AppError::new("RETRIEVAL_FAILED", "Failed to read evidence records")
                    .with_details(e.to_string())
            })?;

        let mut out = Vec::new();
        for r in rows {
            let (fingerprint, text, metadata_json, embedding_json) = r.map_err(|e| {
                AppError::new("RETRIEVAL_FAILED", "Failed to read evidence record row")
                    .with_details(e.to_string())
            })?;
            let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|e| {
                AppError::new("RETRIEVAL_FAILED", "Failed to decode record metadata")
                    .with_details(format!("fingerprint={fingerprint}; err={e}"))
            })?;
            let embedding: Vec<f32> = serde_json::from_str(&embedding_json).map_err(|e| {
                AppError::new("RETRIEVAL_FAILED", "Failed to decode record embedding")
                    .with_details(format!("fingerprint={fingerprint}; err={e}"))
            })?;
            out.push(IndexRecord {
                fingerprint,
                text,
                metadata,
                embedding,
            });
        }
        Ok(out)
    }
}

impl VectorIndex for SqliteIndex {
    fn known_fingerprints(&self, candidates: &[String]) -> Result<BTreeSet<String>, AppError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT 1 FROM evidence_records WHERE fingerprint = ?1")
            .map_err(|e| {
                AppError::new("STORE_LOOKUP_FAILED", "Failed to prepare fingerprint lookup")
                    .with_details(e.to_string())
            })?;

        let mut known = BTreeSet::new();
        for fp in candidates {
            let exists = stmt.exists([fp.as_str()]).map_err(|e| {
                AppError::new("STORE_LOOKUP_FAILED", "Failed to look up fingerprint")
                    .with_details(format!("fingerprint={fp}; err={e}"))
            })?;
            if exists {
                known.insert(fp.clone());
            }
        }
        Ok(known)
    }

    fn insert_if_absent(&self, record: &IndexRecord) -> Result<bool, AppError> {
        let conn = self.lock()?;

        let dims: Option<i64> = conn
            .query_row("SELECT dims FROM evidence_records LIMIT 1", [], |row| row.get(0))
            .optional()
            .map_err(|e| {
                AppError::new("STORE_INSERT_FAILED", "Failed to read index dimensions")
                    .with_details(e.to_string())
            })?;
        let this_dims = record.embedding.len() as i64;
        if let Some(d) = dims {
            if d != this_dims {
                return Err(AppError::new(
                    "STORE_INSERT_FAILED",
                    "Embedding dimension mismatch across records",
                )
                .with_details(format!(
                    "expected={d}; got={this_dims}; fingerprint={}",
                    record.fingerprint
                )));
            }
        }

        let metadata_json = serde_json::to_string(&record.metadata).map_err(|e| {
            AppError::new("STORE_INSERT_FAILED", "Failed to encode record metadata")
                .with_details(e.to_string())
        })?;
        let embedding_json = serde_json::to_string(&record.embedding).map_err(|e| {
            AppError::new("STORE_INSERT_FAILED", "Failed to encode record embedding")
                .with_details(e.to_string())
        })?;

        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO evidence_records(fingerprint, text, metadata_json, embedding_json, dims, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
                params![
                    record.fingerprint,
                    record.text,
                    metadata_json,
                    embedding_json,
                    this_dims
                ],
            )
            .map_err(|e| {
                AppError::new("STORE_INSERT_FAILED", "Failed to insert evidence record")
                    .with_details(format!("fingerprint={}; err={}", record.fingerprint, e))
                    .with_retryable(true)
            })?;
        Ok(changed == 1)
    }

    fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>, AppError> {
        let conn = self.lock()?;
        let records = Self::read_all(&conn)?;
        rank(query, records, k)
    }

    fn len(&self) -> Result<usize, AppError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM evidence_records", [], |row| row.get(0))
            .map_err(|e| {
                AppError::new("STORE_LOOKUP_FAILED", "Failed to count evidence records")
                    .with_details(e.to_string())
            })?;
        Ok(count.max(0) as usize)
    }
}
