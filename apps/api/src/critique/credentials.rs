//! Credential Validator — local, syntactic checks on the OpenRouter key.
//!
//! Runs before any network call. A key that fails here is never sent.

use thiserror::Error;

use crate::config::Credentials;

/// Every OpenRouter key starts with this.
pub const KEY_PREFIX: &str = "sk-or-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("OPENROUTER_API_KEY is not set. Please add it to your .env file.")]
    MissingKey,

    #[error("The OPENROUTER_API_KEY does not look correct. It should start with 'sk-or-'.")]
    MalformedKey,
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), CredentialError> {
    validate_key(&credentials.api_key)
}

pub fn validate_key(api_key: &str) -> Result<(), CredentialError> {
    if api_key.trim().is_empty() {
        return Err(CredentialError::MissingKey);
    }
    if !api_key.starts_with(KEY_PREFIX) {
        return Err(CredentialError::MalformedKey);
    }
    Ok(())
}
