//! HTTP client for the Arcade tool API.

use super::types::{
    AuthorizationResponse, AuthorizeRequest, ExecuteToolRequest, ExecuteToolResponse, Page,
    ToolDefinition,
};
use super::ToolProvider;
use crate::config::{ArcadeCredentials, Settings};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Arcade API client authenticated with a bearer API key.
#[derive(Clone)]
pub struct ArcadeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl fmt::Debug for ArcadeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcadeClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ArcadeClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            AgentError::Config(format!("Invalid Arcade base URL {}: {}", base_url, e))
        })?;

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// Create a client from resolved credentials and settings.
    pub fn from_credentials(credentials: &ArcadeCredentials, settings: &Settings) -> Result<Self> {
        let api_key = credentials.api_key.as_deref().ok_or_else(|| {
            AgentError::Config(format!(
                "Missing {}. Add it to your .env file.",
                crate::config::env::ARCADE_API_KEY_VAR
            ))
        })?;

        Self::new(
            &credentials.base_url,
            api_key,
            Duration::from_secs(settings.arcade.request_timeout_secs),
        )
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AgentError::Config(format!("Invalid Arcade endpoint {}: {}", path, e)))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turn a non-success response into an [`AgentError::Arcade`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AgentError::Arcade {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json["message"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .or_else(|| json["error"]["message"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) if body.is_empty() => "empty response body".to_string(),
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl ToolProvider for ArcadeClient {
    #[instrument(skip(self))]
    async fn list_tools(
        &self,
        toolkit: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<ToolDefinition>> {
        let url = self.endpoint("v1/tools")?;
        debug!("Listing tools for toolkit {} (offset {})", toolkit, offset);

        let builder = self.request(self.http.get(url)).query(&[
            ("toolkit", toolkit.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ]);
        self.send(builder).await
    }

    #[instrument(skip(self))]
    async fn get_tool(&self, name: &str) -> Result<ToolDefinition> {
        let url = self.endpoint(&format!("v1/tools/{}", name))?;
        self.send(self.request(self.http.get(url))).await
    }

    #[instrument(skip(self))]
    async fn authorize(&self, tool_name: &str, user_id: &str) -> Result<AuthorizationResponse> {
        let url = self.endpoint("v1/tools/authorize")?;
        let body = AuthorizeRequest { tool_name, user_id };
        self.send(self.request(self.http.post(url)).json(&body)).await
    }

    #[instrument(skip(self))]
    async fn auth_status(
        &self,
        authorization_id: &str,
        wait_secs: u64,
    ) -> Result<AuthorizationResponse> {
        let url = self.endpoint("v1/auth/status")?;
        // The server holds the request open for up to `wait_secs`.
        let builder = self
            .request(self.http.get(url))
            .timeout(self.timeout + Duration::from_secs(wait_secs))
            .query(&[
                ("id", authorization_id.to_string()),
                ("wait", wait_secs.to_string()),
            ]);
        self.send(builder).await
    }

    #[instrument(skip(self, input))]
    async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        user_id: &str,
    ) -> Result<ExecuteToolResponse> {
        let url = self.endpoint("v1/tools/execute")?;
        let body = ExecuteToolRequest {
            tool_name,
            input,
            user_id,
        };
        self.send(self.request(self.http.post(url)).json(&body)).await
    }
}
