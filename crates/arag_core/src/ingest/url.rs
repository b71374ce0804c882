use scraper::{Html, Node};

use crate::domain::{Document, SourceKind};

use super::fetch::Fetcher;
use super::now_rfc3339;

// Elements whose text is never visible on the rendered page.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Load one page as a `user_url` document.
///
/// Fetch failures are logged and produce an empty result so that a batch of
/// sources can continue past one bad URL.
pub fn load_from_url(fetcher: &dyn Fetcher, url: &str) -> Vec<Document> {
    let body = match fetcher.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url, error = %e, "skipping url that failed to load");
            return Vec::new();
        }
    };

    let text = html_to_text(&body);
    tracing::info!(url, chars = text.len(), "loaded url");
    vec![Document::new(text, SourceKind::UserUrl, url)
        .with_meta("url", url)
        .with_meta("loaded_at", now_rfc3339())]
}

/// Visible text of an HTML page: every text node outside hidden elements,
/// trimmed, non-empty, joined with newlines.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => HIDDEN_ELEMENTS.contains(&el.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        let t = text.trim();
        if !t.is_empty() {
            lines.push(t);
        }
    }
    lines.join("\n")
}
