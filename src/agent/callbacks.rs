//! Hooks that run before a tool is invoked.

use async_trait::async_trait;
use serde_json::Value;

/// A pending tool call, as seen by a before-tool callback.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvocation<'a> {
    /// Qualified tool name (`Youtube.SearchForVideos`).
    pub tool_name: &'a str,
    pub args: &'a Value,
    pub user_id: &'a str,
}

/// Outcome of a before-tool callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDecision {
    Allow,
    /// Skip the call; `reason` is returned to the model as the tool result.
    Deny { reason: String },
}

impl ToolDecision {
    /// Standard denial for a user who declined the call.
    pub fn denied_by_user(tool_name: &str) -> Self {
        ToolDecision::Deny {
            reason: format!("The user denied permission to run {}.", tool_name),
        }
    }
}

/// Runs before every tool invocation and may veto it.
#[async_trait]
pub trait BeforeToolCallback: Send + Sync {
    async fn before_tool(&self, invocation: &ToolInvocation<'_>) -> ToolDecision;
}

/// Approves every call without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl BeforeToolCallback for AutoApprove {
    async fn before_tool(&self, _invocation: &ToolInvocation<'_>) -> ToolDecision {
        ToolDecision::Allow
    }
}
