use std::path::Path;

use crate::domain::{Document, SourceKind};
use crate::error::AppError;

use super::now_rfc3339;

/// Extract the text of every page of a PDF as one `user_pdf` document.
///
/// An unreadable or unparseable file is a user error and is returned to the caller.
pub fn load_from_pdf(path: &Path) -> Result<Vec<Document>, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::new("INGEST_PDF_MALFORMED", "Failed to read PDF file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        AppError::new("INGEST_PDF_MALFORMED", "Failed to parse PDF file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    tracing::info!(file = %filename, chars = text.len(), "loaded pdf");

    Ok(vec![Document::new(text, SourceKind::UserPdf, filename.clone())
        .with_meta("filename", filename)
        .with_meta("loaded_at", now_rfc3339())])
}
