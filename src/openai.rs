//! OpenAI client configuration with sensible defaults.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Optional override for OpenAI-compatible endpoints.
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    // OpenAIConfig::default() picks up OPENAI_API_KEY.
    let mut config = OpenAIConfig::default();
    if let Ok(base) = std::env::var(BASE_URL_VAR) {
        if !base.is_empty() {
            config = config.with_api_base(base);
        }
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
