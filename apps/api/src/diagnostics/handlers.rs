use axum::{extract::State, http::StatusCode, Json};

use crate::diagnostics::{run_probe, DiagnosticsSummary, ProbeOutcome};
use crate::errors::AnalysisError;
use crate::state::AppState;

/// GET /api/v1/diagnostics
pub async fn handle_summary(State(state): State<AppState>) -> Json<DiagnosticsSummary> {
    Json(DiagnosticsSummary::from_credentials(&state.config.openrouter))
}

/// GET /api/v1/diagnostics/connectivity
///
/// Direct call to the model-listing endpoint. The provider's status and body are
/// returned as-is; a probe that never got an answer is a 502.
pub async fn handle_connectivity(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ProbeOutcome>), AnalysisError> {
    if state.config.openrouter.api_key.is_empty() {
        return Err(AnalysisError::MissingKey);
    }

    let outcome = run_probe(state.llm.as_ref()).await;
    let status = match outcome {
        ProbeOutcome::Completed(_) => StatusCode::OK,
        ProbeOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(outcome)))
}
