//! Diagnostics — what the service knows about its OpenRouter setup, plus a direct
//! connectivity probe against the model-listing endpoint.
//!
//! The probe is read-only and shares nothing with the critique pipeline beyond the
//! provider handle. The pipeline reuses `run_probe` after an authentication failure.

pub mod handlers;

use serde::Serialize;
use tracing::warn;

use crate::config::Credentials;
use crate::critique::credentials::KEY_PREFIX;
use crate::llm_client::{CompletionProvider, ProbeReport};

/// Result of a connectivity probe: the provider's raw answer, or why no answer came.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Completed(ProbeReport),
    Failed { message: String },
}

/// Configuration facts safe to show the user. Never includes the key itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsSummary {
    pub key_loaded: bool,
    pub key_length: usize,
    pub key_has_expected_prefix: bool,
    pub site_url: String,
    pub model: String,
}

impl DiagnosticsSummary {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            key_loaded: !credentials.api_key.is_empty(),
            key_length: credentials.api_key.chars().count(),
            key_has_expected_prefix: credentials.api_key.starts_with(KEY_PREFIX),
            site_url: credentials.site_url.clone(),
            model: credentials.model.clone(),
        }
    }
}

pub async fn run_probe(provider: &dyn CompletionProvider) -> ProbeOutcome {
    match provider.probe().await {
        Ok(report) => ProbeOutcome::Completed(report),
        Err(e) => {
            warn!("Connectivity probe failed: {e}");
            ProbeOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}
