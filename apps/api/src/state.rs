use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; nothing is carried between analyses.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Provider backend. `OpenRouterClient` in production, a recording mock in tests.
    pub llm: Arc<dyn CompletionProvider>,
}
