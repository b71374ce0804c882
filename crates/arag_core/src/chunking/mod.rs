use sha2::{Digest, Sha256};

use crate::domain::{
    Chunk, Document, META_FINGERPRINT, META_ORDINAL, META_ORIGIN, META_SOURCE,
};

pub mod splitter;

pub use splitter::{
    RecursiveSplitter, SplitterConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_SEPARATORS,
};

/// Hex SHA-256 of the UTF-8 bytes of `text`. This is the dedup key for stored evidence.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Split documents with the default splitter (1500 chars, 100 overlap).
pub fn split_documents(documents: &[Document]) -> Vec<Chunk> {
    split_documents_with(&RecursiveSplitter::default(), documents)
}

pub fn split_documents_with(splitter: &RecursiveSplitter, documents: &[Document]) -> Vec<Chunk> {
    let mut out = Vec::new();
    for doc in documents {
        for (i, text) in splitter.split_text(&doc.content).into_iter().enumerate() {
            out.push(chunk_from_text(doc, i as u32, text));
        }
    }
    tracing::info!(
        documents = documents.len(),
        chunks = out.len(),
        "split documents into chunks"
    );
    out
}

fn chunk_from_text(doc: &Document, ordinal: u32, text: String) -> Chunk {
    let fp = fingerprint(&text);
    let mut metadata = doc.metadata.clone();
    metadata.insert(META_FINGERPRINT.to_string(), fp.clone());
    metadata.insert(META_SOURCE.to_string(), doc.source.as_str().to_string());
    metadata.insert(META_ORIGIN.to_string(), doc.origin.clone());
    metadata.insert(META_ORDINAL.to_string(), ordinal.to_string());
    Chunk {
        text,
        fingerprint: fp,
        source: doc.source,
        origin: doc.origin.clone(),
        ordinal,
        metadata,
    }
}
