use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::Document;
use crate::error::AppError;

pub mod fetch;
pub mod pdf;
pub mod seed;
pub mod url;

pub use fetch::{Fetcher, HttpFetcher, FETCH_TIMEOUT};
pub use pdf::load_from_pdf;
pub use seed::{load_default_documents, DEFAULT_SEED_URLS};
pub use url::{html_to_text, load_from_url};

/// One user-requested input to ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SourceSpec {
    Url(String),
    Pdf(PathBuf),
    Defaults,
}

/// Resolve sources in order. URL failures are skipped; a bad PDF aborts the load.
/// With no sources at all, the default seed list is used.
pub fn load_sources(fetcher: &dyn Fetcher, specs: &[SourceSpec]) -> Result<Vec<Document>, AppError> {
    if specs.is_empty() {
        tracing::info!("no sources given; using default seed documents");
        return Ok(load_default_documents(fetcher));
    }

    let mut docs = Vec::new();
    for spec in specs {
        match spec {
            SourceSpec::Url(u) => docs.extend(load_from_url(fetcher, u)),
            SourceSpec::Pdf(p) => docs.extend(load_from_pdf(p)?),
            SourceSpec::Defaults => docs.extend(load_default_documents(fetcher)),
        }
    }
    Ok(docs)
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
