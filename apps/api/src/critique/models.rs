use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared type of an uploaded resume. Decides the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Resolves the kind from an upload's declared content type and filename.
    /// Only PDFs are recognised explicitly; everything else is read as text.
    pub fn from_upload(content_type: Option<&str>, file_name: Option<&str>) -> Self {
        let is_pdf_mime = content_type
            .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false);
        let is_pdf_name = file_name
            .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false);

        if is_pdf_mime || is_pdf_name {
            DocumentKind::Pdf
        } else {
            DocumentKind::PlainText
        }
    }
}

/// A resume as submitted. Consumed once by the extractor, never stored.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(kind: DocumentKind, bytes: impl Into<Bytes>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    #[cfg(test)]
    pub fn plain_text(text: &str) -> Self {
        Self::new(DocumentKind::PlainText, text.as_bytes().to_vec())
    }
}

/// Text pulled out of an uploaded document, exactly as the extractor produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only text cannot be critiqued.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Successful analysis, returned once and not cached.
#[derive(Debug, Clone, Serialize)]
pub struct Critique {
    pub analysis_id: Uuid,
    pub critique: String,
    pub model: String,
    pub document_kind: DocumentKind,
    /// Role the prompt was tailored to (the default when no hint was given).
    pub role: String,
    pub generated_at: DateTime<Utc>,
}
