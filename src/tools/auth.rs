//! Per-user authorization of provisioned tools.
//!
//! Every tool is authorized for the user before the agent is assembled.
//! Tools that need an OAuth grant come back `pending` with a URL; the gate
//! shows the URL and long-polls the provider until the user finishes.

use crate::arcade::{AuthorizationResponse, AuthorizationStatus, ToolDefinition, ToolProvider};
use crate::config::AuthFailurePolicy;
use crate::error::{AgentError, Result};
use crate::tools::ToolSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Seconds the provider may hold each status request open.
const STATUS_WAIT_SECS: u64 = 59;

/// Receives user-facing authorization notices.
pub trait AuthPrompt: Send + Sync {
    /// The user must visit `url` to authorize `tool`.
    fn authorization_required(&self, _tool: &str, _url: &str) {}

    /// A pending authorization finished successfully.
    fn authorization_completed(&self, _tool: &str) {}
}

/// Prompt that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPrompt;

impl AuthPrompt for SilentPrompt {}

/// Outcome of authorizing a batch of tools.
#[derive(Debug, Default)]
pub struct AuthorizationReport {
    /// Tools cleared for the user, in input order.
    pub authorized: Vec<ToolDefinition>,
    /// Tools dropped under the `skip` policy, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl AuthorizationReport {
    /// Tool set of the authorized tools, executing through `provider`.
    pub fn into_tool_set(self, provider: Arc<dyn ToolProvider>) -> ToolSet {
        ToolSet::new(provider, self.authorized)
    }
}

/// Authorizes tools for one user before they reach the agent.
pub struct AuthorizationGate<'a> {
    provider: &'a dyn ToolProvider,
    policy: AuthFailurePolicy,
    timeout: Duration,
    prompt: &'a dyn AuthPrompt,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(provider: &'a dyn ToolProvider, policy: AuthFailurePolicy) -> Self {
        Self {
            provider,
            policy,
            timeout: Duration::from_secs(600),
            prompt: &SilentPrompt,
        }
    }

    /// Bound the wait for a pending authorization.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompt(mut self, prompt: &'a dyn AuthPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Authorize every tool for `user_id`, in order.
    ///
    /// Under [`AuthFailurePolicy::Abort`] the first failure is returned as
    /// an [`AgentError::Authorization`]; under [`AuthFailurePolicy::Skip`]
    /// the failed tool is left out of the report's authorized list.
    pub async fn authorize_all(
        &self,
        tools: Vec<ToolDefinition>,
        user_id: &str,
    ) -> Result<AuthorizationReport> {
        if user_id.trim().is_empty() {
            return Err(AgentError::Config(
                "A non-empty user id is required for tool authorization".to_string(),
            ));
        }

        debug!(
            "Authorizing {} tool(s) for {} (on failure: {})",
            tools.len(),
            user_id,
            self.policy
        );
        let mut report = AuthorizationReport::default();

        for tool in tools {
            let name = tool.qualified_name();
            match self.authorize_one(&name, user_id).await {
                Ok(()) => {
                    debug!("Authorized {} for {}", name, user_id);
                    report.authorized.push(tool);
                }
                Err(reason) => match self.policy {
                    AuthFailurePolicy::Abort => {
                        return Err(AgentError::Authorization { tool: name, reason });
                    }
                    AuthFailurePolicy::Skip => {
                        warn!("Skipping {}: {}", name, reason);
                        report.skipped.push((name, reason));
                    }
                },
            }
        }

        info!(
            "Authorized {} tool(s), skipped {}",
            report.authorized.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Authorize a single tool; `Err` carries the failure reason.
    async fn authorize_one(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> std::result::Result<(), String> {
        let response = self
            .provider
            .authorize(tool_name, user_id)
            .await
            .map_err(|e| e.to_string())?;

        let response = if response.is_pending() {
            let url = response
                .url
                .as_deref()
                .ok_or_else(|| "authorization pending but no URL was provided".to_string())?;
            self.prompt.authorization_required(tool_name, url);

            let done = self.wait_for_completion(&response).await?;
            if done.status == AuthorizationStatus::Completed {
                self.prompt.authorization_completed(tool_name);
            }
            done
        } else {
            response
        };

        match response.status {
            AuthorizationStatus::Completed => Ok(()),
            status => Err(format!("authorization status {}", status)),
        }
    }

    /// Poll until the authorization leaves the pending state or times out.
    async fn wait_for_completion(
        &self,
        response: &AuthorizationResponse,
    ) -> std::result::Result<AuthorizationResponse, String> {
        let id = response
            .id
            .as_deref()
            .ok_or_else(|| "authorization pending but no id was provided".to_string())?;

        let poll = async {
            loop {
                let status = self
                    .provider
                    .auth_status(id, STATUS_WAIT_SECS)
                    .await
                    .map_err(|e| e.to_string())?;
                if !status.is_pending() {
                    return Ok::<_, String>(status);
                }
                debug!("Authorization {} still pending", id);
            }
        };

        tokio::time::timeout(self.timeout, poll).await.map_err(|_| {
            format!(
                "timed out after {}s waiting for authorization",
                self.timeout.as_secs()
            )
        })?
    }
}
