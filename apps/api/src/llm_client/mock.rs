use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionProvider, LlmError, ProbeBody, ProbeReport};

/// Every call a `MockProvider` received, per endpoint.
#[derive(Debug, Clone, Default)]
pub struct RecordedCalls {
    pub list_models: usize,
    /// (system, prompt) for each completion request.
    pub completions: Vec<(String, String)>,
    pub probes: usize,
}

impl RecordedCalls {
    pub fn total(&self) -> usize {
        self.list_models + self.completions.len() + self.probes
    }
}

/// Scripted `CompletionProvider` that records what it was asked.
pub struct MockProvider {
    model: String,
    list_models: Result<(), (u16, String)>,
    completion: Result<String, (u16, String)>,
    probe_reachable: bool,
    calls: Mutex<RecordedCalls>,
}

impl MockProvider {
    pub fn succeeding(critique: &str) -> Self {
        Self {
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            list_models: Ok(()),
            completion: Ok(critique.to_string()),
            probe_reachable: true,
            calls: Mutex::new(RecordedCalls::default()),
        }
    }

    pub fn with_list_models_error(mut self, status: u16, message: &str) -> Self {
        self.list_models = Err((status, message.to_string()));
        self
    }

    pub fn with_completion_error(mut self, status: u16, message: &str) -> Self {
        self.completion = Err((status, message.to_string()));
        self
    }

    pub fn with_unreachable_probe(mut self) -> Self {
        self.probe_reachable = false;
        self
    }

    pub fn calls(&self) -> RecordedCalls {
        self.calls.lock().unwrap().clone()
    }
}

fn api_error((status, message): &(u16, String)) -> LlmError {
    LlmError::Api {
        status: *status,
        message: message.clone(),
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn list_models(&self) -> Result<(), LlmError> {
        self.calls.lock().unwrap().list_models += 1;
        self.list_models.as_ref().map(|_| ()).map_err(api_error)
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .completions
            .push((system.to_string(), prompt.to_string()));
        self.completion.clone().map_err(|e| api_error(&e))
    }

    async fn probe(&self) -> Result<ProbeReport, LlmError> {
        self.calls.lock().unwrap().probes += 1;
        if !self.probe_reachable {
            return Err(LlmError::Api {
                status: 503,
                message: "connection refused".to_string(),
            });
        }
        let status_code = match (&self.list_models, &self.completion) {
            (Err((status, _)), _) | (Ok(()), Err((status, _))) => *status,
            _ => 200,
        };
        Ok(ProbeReport {
            status_code,
            body: ProbeBody::from_text(r#"{"data":[]}"#.to_string()),
        })
    }
}
