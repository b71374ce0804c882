use crate::domain::{Document, SourceKind};

use super::fetch::Fetcher;
use super::url::load_from_url;

/// Seed corpus loaded when the user supplies no sources of their own.
pub const DEFAULT_SEED_URLS: [&str; 3] = [
    "https://lilianweng.github.io/posts/2023-06-23-agent/",
    "https://lilianweng.github.io/posts/2023-03-15-prompt-engineering/",
    "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/",
];

pub fn load_default_documents(fetcher: &dyn Fetcher) -> Vec<Document> {
    load_seed_urls(fetcher, &DEFAULT_SEED_URLS)
}

/// Load each seed URL independently; failed URLs are skipped.
pub fn load_seed_urls(fetcher: &dyn Fetcher, urls: &[&str]) -> Vec<Document> {
    let mut docs = Vec::new();
    for url in urls {
        for mut doc in load_from_url(fetcher, url) {
            doc.source = SourceKind::DefaultSeed;
            docs.push(doc);
        }
    }
    tracing::info!(requested = urls.len(), loaded = docs.len(), "loaded seed documents");
    docs
}
