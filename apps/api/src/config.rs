use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SITE_URL: &str = "http://localhost:8501";
pub const DEFAULT_APP_NAME: &str = "AI Resume Critiquer";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Application configuration loaded from environment variables.
/// Read once at startup; a missing API key is reported per request, not here.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter: Credentials,
    pub openrouter_base_url: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the provider needs to identify the caller and pick a model.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub site_url: String,
    pub app_name: String,
    pub model: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &format_args!("<{} chars>", self.api_key.chars().count()))
            .field("site_url", &self.site_url)
            .field("app_name", &self.app_name)
            .field("model", &self.model)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|k| k.trim().to_string())
            .unwrap_or_default();
        let model = lookup("OPENROUTER_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = match lookup("OPENROUTER_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("OPENROUTER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => 120,
        };

        Ok(Config {
            openrouter: Credentials {
                api_key,
                site_url: lookup("OPENROUTER_SITE_URL")
                    .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
                app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                model,
            },
            openrouter_base_url: lookup("OPENROUTER_BASE_URL")
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            port: lookup("PORT")
                .unwrap_or_else(|| "8501".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Default tracing filter when `RUST_LOG` holds no valid directive. `tower_http`
    /// is enabled at debug so `TraceLayer` request spans show up.
    pub fn log_directive(&self) -> String {
        format!(
            "{}={},tower_http=debug",
            env!("CARGO_CRATE_NAME"),
            self.rust_log
        )
    }
}
