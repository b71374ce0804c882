use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Metadata = BTreeMap<String, String>;

// Reserved chunk metadata keys; always written by the chunker.
pub const META_FINGERPRINT: &str = "fingerprint";
pub const META_SOURCE: &str = "source";
pub const META_ORIGIN: &str = "origin";
pub const META_ORDINAL: &str = "ordinal";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    UserUrl,
    UserPdf,
    DefaultSeed,
    WebResult,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::UserUrl => "user_url",
            SourceKind::UserPdf => "user_pdf",
            SourceKind::DefaultSeed => "default_seed",
            SourceKind::WebResult => "web_result",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user_url" => Some(SourceKind::UserUrl),
            "user_pdf" => Some(SourceKind::UserPdf),
            "default_seed" => Some(SourceKind::DefaultSeed),
            "web_result" => Some(SourceKind::WebResult),
            _ => None,
        }
    }
}

/// Raw unit of content produced by a document source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub source: SourceKind,
    /// URL or filename the content came from.
    pub origin: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, source: SourceKind, origin: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source,
            origin: origin.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Trimmed, fingerprinted slice of a document.
///
/// `metadata` holds the parent document's metadata plus the reserved keys
/// (`fingerprint`, `source`, `origin`, `ordinal`), so a chunk can be rebuilt
/// from its stored metadata alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub fingerprint: String,
    pub source: SourceKind,
    pub origin: String,
    pub ordinal: u32,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn into_document(self) -> Document {
        Document {
            content: self.text,
            source: self.source,
            origin: self.origin,
            metadata: self.metadata,
        }
    }
}
