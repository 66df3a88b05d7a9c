//! Axum route handlers for the Critique API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::critique::models::{Critique, DocumentKind, UploadedDocument};
use crate::critique::pipeline::{run_analysis, AnalysisRequest};
use crate::errors::AnalysisError;
use crate::state::AppState;

/// POST /api/v1/critique
///
/// Multipart form: `file` (PDF or plain text) and an optional `job_role`.
/// Runs the full pipeline and returns the critique, or a classified error body.
/// An unreadable upload (over the body limit, truncated) is `INVALID_UPLOAD`.
pub async fn handle_critique(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Critique>, AnalysisError> {
    let request = read_upload(&mut multipart).await?;
    let critique = run_analysis(request, &state.config.openrouter, state.llm.as_ref()).await?;
    Ok(Json(critique))
}

/// Collects the form fields. A zero-byte `file` part (an empty file picker) counts
/// as no upload at all.
async fn read_upload(multipart: &mut Multipart) -> Result<AnalysisRequest, AnalysisError> {
    let mut request = AnalysisRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let kind = DocumentKind::from_upload(field.content_type(), field.file_name());
                let bytes = field.bytes().await?;
                request.document =
                    (!bytes.is_empty()).then(|| UploadedDocument::new(kind, bytes));
            }
            Some("job_role") => request.role_hint = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(request)
}
