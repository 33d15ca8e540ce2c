//! Arcade tool platform integration.
//!
//! Arcade hosts the YouTube tools, brokers per-user authorization and
//! executes tool calls on the agent's behalf. Everything else in the crate
//! talks to it through the [`ToolProvider`] trait.

mod client;
mod schema;
mod types;

pub use client::ArcadeClient;
pub use schema::{parameters_schema, to_function_tool};
pub use types::{
    AuthRequirement, AuthorizationResponse, AuthorizationStatus, ExecuteToolResponse, Page,
    ToolDefinition, ToolInput, ToolOutput, ToolOutputError, ToolParameter, ToolRequirements,
    ToolkitInfo, ValueSchema,
};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Source of tool definitions, authorization and tool execution.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// List one page of a toolkit's tools.
    async fn list_tools(
        &self,
        toolkit: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<ToolDefinition>>;

    /// Fetch a single tool by qualified name.
    async fn get_tool(&self, name: &str) -> Result<ToolDefinition>;

    /// Start (or look up) the authorization of a tool for a user.
    async fn authorize(&self, tool_name: &str, user_id: &str) -> Result<AuthorizationResponse>;

    /// Poll an authorization, letting the server wait up to `wait_secs`.
    async fn auth_status(&self, authorization_id: &str, wait_secs: u64)
        -> Result<AuthorizationResponse>;

    /// Execute a tool for a user.
    async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        user_id: &str,
    ) -> Result<ExecuteToolResponse>;
}
