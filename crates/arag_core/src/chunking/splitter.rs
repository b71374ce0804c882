use std::collections::VecDeque;

use crate::error::AppError;

pub const DEFAULT_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
/// Paragraph break, line break, sentence terminator, space.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ".", " "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters (Unicode scalar values).
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,
    /// Highest priority first.
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SplitterConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunk_size == 0 {
            return Err(AppError::new(
                "CHUNK_CONFIG_INVALID",
                "Chunk size must be greater than zero",
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::new(
                "CHUNK_CONFIG_INVALID",
                "Chunk overlap must be smaller than chunk size",
            )
            .with_details(format!(
                "chunk_size={}; chunk_overlap={}",
                self.chunk_size, self.chunk_overlap
            )));
        }
        if self.separators.is_empty() || self.separators.iter().any(|s| s.is_empty()) {
            return Err(AppError::new(
                "CHUNK_CONFIG_INVALID",
                "Separators must be a non-empty list of non-empty strings",
            ));
        }
        Ok(())
    }
}

/// Recursive separator splitter.
///
/// Text is split on the highest-priority separator it contains; pieces that are
/// still too long are split again with the remaining separators. Short pieces
/// are merged back up to `chunk_size`, and consecutive chunks share up to
/// `chunk_overlap` characters. A piece that no remaining separator can break
/// is emitted as-is, even when it exceeds the limit.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: SplitterConfig,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            config: SplitterConfig::default(),
        }
    }
}

impl RecursiveSplitter {
    pub fn new(config: SplitterConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split `text` into chunks. Output chunks are trimmed; empty chunks are dropped.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.config.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = match separators.iter().position(|s| text.contains(s)) {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => (separators[separators.len() - 1], &separators[..0]),
        };

        let mut out = Vec::new();
        let mut short: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                out.extend(self.merge(&short));
                short.clear();
            }
            if remaining.is_empty() {
                out.push(piece.to_string());
            } else {
                out.extend(self.split_recursive(piece, remaining));
            }
        }
        if !short.is_empty() {
            out.extend(self.merge(&short));
        }
        out
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut out = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > size && !window.is_empty() {
                if let Some(joined) = join_trimmed(&window) {
                    out.push(joined);
                }
                // Keep at most `overlap` characters, and always leave room for `piece`.
                while total > overlap || (total > 0 && total + len > size) {
                    match window.pop_front() {
                        Some((_, l)) => total -= l,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }
        if let Some(joined) = join_trimmed(&window) {
            out.push(joined);
        }
        out
    }
}

/// Split on `separator`, attaching each separator occurrence to the start of the
/// piece that follows it. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_trimmed(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
