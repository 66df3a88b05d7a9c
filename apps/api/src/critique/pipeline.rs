//! Critique pipeline — one linear pass per user trigger.
//!
//! document → extract → blank check → prompt → credential check → pre-flight
//! listing → completion. Local failures stop before any network I/O. When the
//! provider rejects the key, exactly one connectivity probe runs and its report is
//! attached to the error.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Credentials;
use crate::critique::credentials::validate_credentials;
use crate::critique::extract::extract_text;
use crate::critique::models::{Critique, UploadedDocument};
use crate::critique::prompts::{build_critique_prompt, resolve_role, CRITIQUE_SYSTEM};
use crate::diagnostics::run_probe;
use crate::errors::AnalysisError;
use crate::llm_client::CompletionProvider;

/// What the user submitted with a single trigger.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub document: Option<UploadedDocument>,
    pub role_hint: Option<String>,
}

pub async fn run_analysis(
    request: AnalysisRequest,
    credentials: &Credentials,
    llm: &dyn CompletionProvider,
) -> Result<Critique, AnalysisError> {
    let analysis_id = Uuid::new_v4();
    let document = request.document.ok_or(AnalysisError::EmptyInput)?;
    info!(
        %analysis_id,
        kind = ?document.kind,
        bytes = document.bytes.len(),
        "Starting resume analysis"
    );

    let text = extract_text(&document).await?;
    if text.is_blank() {
        return Err(AnalysisError::BlankContent);
    }

    let role_hint = request.role_hint.as_deref();
    let prompt = build_critique_prompt(&text, role_hint);
    info!(%analysis_id, prompt_chars = prompt.len(), "Critique prompt built");

    validate_credentials(credentials)?;

    if let Err(e) = llm.list_models().await {
        warn!(%analysis_id, "Pre-flight model listing failed: {e}");
        return Err(authentication_failure(llm).await);
    }

    let critique = match llm.complete(CRITIQUE_SYSTEM, &prompt).await {
        Ok(critique) => critique,
        Err(e) if e.is_unauthorized() => {
            warn!(%analysis_id, "Completion rejected the API key: {e}");
            return Err(authentication_failure(llm).await);
        }
        Err(e) => {
            return Err(AnalysisError::Request {
                message: e.to_string(),
            })
        }
    };

    info!(%analysis_id, model = llm.model(), "Resume analysis complete");

    Ok(Critique {
        analysis_id,
        critique,
        model: llm.model().to_string(),
        document_kind: document.kind,
        role: resolve_role(role_hint).to_string(),
        generated_at: Utc::now(),
    })
}

/// Runs the follow-up connectivity probe so the user sees what the provider said.
async fn authentication_failure(llm: &dyn CompletionProvider) -> AnalysisError {
    AnalysisError::Authentication {
        diagnostics: Some(run_probe(llm).await),
    }
}
