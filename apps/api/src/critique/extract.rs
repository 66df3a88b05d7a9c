//! Text Extractor — turns an uploaded resume into plain text.
//!
//! PDFs are parsed page by page with `pdf-extract`; every page's text is followed by
//! a newline and the pages are joined in document order. Plain-text uploads are
//! decoded as UTF-8 with no normalisation. Blank output is not an error here: the
//! pipeline checks for it separately so it can be reported on its own.

use thiserror::Error;
use tracing::{info, warn};

use crate::critique::models::{DocumentKind, ExtractedText, UploadedDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("The PDF could not be read. It may be corrupt, encrypted or not a PDF.")]
    MalformedPdf,

    #[error("The text file is not valid UTF-8.")]
    InvalidEncoding,
}

impl ExtractionError {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::MalformedPdf => "malformed_pdf",
            ExtractionError::InvalidEncoding => "invalid_encoding",
        }
    }
}

pub async fn extract_text(document: &UploadedDocument) -> Result<ExtractedText, ExtractionError> {
    match document.kind {
        DocumentKind::Pdf => extract_pdf(document).await,
        DocumentKind::PlainText => decode_plain_text(&document.bytes),
    }
}

/// PDF parsing is CPU-bound and `pdf-extract` can panic on hostile input, so it
/// runs on the blocking pool; a panicked task counts as an unreadable PDF.
async fn extract_pdf(document: &UploadedDocument) -> Result<ExtractedText, ExtractionError> {
    let bytes = document.bytes.clone();
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(|e| {
        warn!("PDF extraction task failed: {e}");
        ExtractionError::MalformedPdf
    })?
    .map_err(|e| {
        warn!("PDF could not be parsed: {e}");
        ExtractionError::MalformedPdf
    })?;

    info!(page_count = pages.len(), "PDF text extraction complete");
    Ok(ExtractedText::new(join_pages(pages)))
}

fn join_pages(pages: Vec<String>) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        text.push_str(&page);
        text.push('\n');
    }
    text
}

fn decode_plain_text(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    String::from_utf8(bytes.to_vec())
        .map(ExtractedText::new)
        .map_err(|e| {
            warn!("Plain-text upload is not UTF-8: {e}");
            ExtractionError::InvalidEncoding
        })
}
