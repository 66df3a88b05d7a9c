use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::critique::credentials::CredentialError;
use crate::critique::extract::ExtractionError;
use crate::diagnostics::ProbeOutcome;

/// Every way a critique request can fail. Closed set: callers match exhaustively.
/// Implements `IntoResponse` so handlers can return `Result<T, AnalysisError>`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Please upload your resume (PDF or TXT) before requesting an analysis.")]
    EmptyInput,

    #[error("{0}")]
    Extraction(ExtractionError),

    #[error("File does not have any content...")]
    BlankContent,

    #[error("OPENROUTER_API_KEY is not set. Please add it to your .env file.")]
    MissingKey,

    #[error("The OPENROUTER_API_KEY does not look correct. It should start with 'sk-or-'.")]
    MalformedKey,

    /// The provider rejected the key. Carries the follow-up probe, when one ran.
    #[error("Authentication failed with OpenRouter (401). Please verify your API key and account status.")]
    Authentication { diagnostics: Option<ProbeOutcome> },

    #[error("An error occurred: {message}")]
    Request { message: String },

    /// The multipart body could not be read: too large, truncated, or malformed.
    #[error("The upload could not be read: {message}")]
    InvalidUpload { status: StatusCode, message: String },
}

impl From<MultipartError> for AnalysisError {
    fn from(err: MultipartError) -> Self {
        AnalysisError::InvalidUpload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<ExtractionError> for AnalysisError {
    fn from(err: ExtractionError) -> Self {
        AnalysisError::Extraction(err)
    }
}

impl From<CredentialError> for AnalysisError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingKey => AnalysisError::MissingKey,
            CredentialError::MalformedKey => AnalysisError::MalformedKey,
        }
    }
}

impl AnalysisError {
    /// Stable code used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "EMPTY_INPUT",
            AnalysisError::Extraction(ExtractionError::MalformedPdf) => "MALFORMED_PDF",
            AnalysisError::Extraction(ExtractionError::InvalidEncoding) => "INVALID_ENCODING",
            AnalysisError::BlankContent => "BLANK_CONTENT",
            AnalysisError::MissingKey => "MISSING_KEY",
            AnalysisError::MalformedKey => "MALFORMED_KEY",
            AnalysisError::Authentication { .. } => "AUTHENTICATION_ERROR",
            AnalysisError::Request { .. } => "REQUEST_ERROR",
            AnalysisError::InvalidUpload { .. } => "INVALID_UPLOAD",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
            AnalysisError::Extraction(_) | AnalysisError::BlankContent => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalysisError::MissingKey | AnalysisError::MalformedKey => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AnalysisError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AnalysisError::Request { .. } => StatusCode::BAD_GATEWAY,
            AnalysisError::InvalidUpload { status, .. } => *status,
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        match &self {
            AnalysisError::Authentication { .. } => {
                tracing::error!("Provider rejected the API key");
            }
            AnalysisError::Request { message } => {
                tracing::error!("Provider request failed: {message}");
            }
            other => tracing::warn!("Analysis rejected: {other}"),
        }

        let mut error = json!({
            "code": code,
            "message": message,
        });
        match &self {
            AnalysisError::Extraction(err) => error["reason"] = json!(err.reason()),
            AnalysisError::Authentication {
                diagnostics: Some(outcome),
            } => error["diagnostics"] = serde_json::to_value(outcome).unwrap_or_default(),
            _ => {}
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
