//! In-memory doubles shared by unit tests.

use crate::agent::{ChatModel, ModelRequest, ModelResponse};
use crate::arcade::{
    AuthorizationResponse, AuthorizationStatus, ExecuteToolResponse, Page, ToolDefinition,
    ToolInput, ToolOutput, ToolParameter, ToolProvider, ToolkitInfo, ValueSchema,
};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// A tool with a single required string parameter.
pub fn tool_def(toolkit: &str, name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        qualified_name: format!("{}.{}", toolkit, name),
        fully_qualified_name: format!("{}.{}@1.0.0", toolkit, name),
        description: Some(format!("{} from {}", name, toolkit)),
        toolkit: ToolkitInfo {
            name: toolkit.to_string(),
            version: Some("1.0.0".to_string()),
            description: None,
        },
        input: ToolInput {
            parameters: vec![ToolParameter {
                name: "keywords".to_string(),
                required: true,
                description: Some("Search keywords".to_string()),
                value_schema: ValueSchema {
                    val_type: "string".to_string(),
                    inner_val_type: None,
                    enum_values: None,
                },
                inferrable: Some(true),
            }],
        },
        requirements: None,
    }
}

/// Scriptable [`ToolProvider`] that records every call.
///
/// Authorization completes immediately unless a status sequence is set for
/// the tool: the first status answers `authorize`, each later one answers a
/// status poll, and the last one repeats once the sequence runs out.
pub struct FakeProvider {
    tools: Vec<ToolDefinition>,
    page_size: usize,
    auth: Mutex<HashMap<String, VecDeque<AuthorizationStatus>>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools,
            page_size: usize::MAX,
            auth: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Cap every listed page at `size` items.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_auth_sequence(self, tool: &str, statuses: Vec<AuthorizationStatus>) -> Self {
        self.auth
            .lock()
            .unwrap()
            .insert(tool.to_string(), statuses.into());
        self
    }

    /// Make `authorize` fail with a transport-level error for `tool`.
    pub fn failing_authorize(mut self, tool: &str) -> Self {
        self.failing.insert(tool.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_status(&self, tool: &str) -> AuthorizationStatus {
        let mut auth = self.auth.lock().unwrap();
        match auth.get_mut(tool) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().copied().unwrap_or(AuthorizationStatus::Completed),
            None => AuthorizationStatus::Completed,
        }
    }

    fn auth_response(tool: &str, status: AuthorizationStatus) -> AuthorizationResponse {
        AuthorizationResponse {
            id: Some(format!("auth-{}", tool)),
            status,
            url: (status != AuthorizationStatus::Completed)
                .then(|| format!("https://auth.example.com/{}", tool)),
            scopes: vec![],
            provider_id: Some("google".to_string()),
            user_id: None,
        }
    }
}

#[async_trait]
impl ToolProvider for FakeProvider {
    async fn list_tools(
        &self,
        toolkit: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<ToolDefinition>> {
        self.record(format!("list {} {}", toolkit, offset));

        let matching: Vec<ToolDefinition> = self
            .tools
            .iter()
            .filter(|t| t.toolkit.name.eq_ignore_ascii_case(toolkit))
            .cloned()
            .collect();
        let total = matching.len();
        let items: Vec<ToolDefinition> = matching
            .into_iter()
            .skip(offset)
            .take(limit.min(self.page_size))
            .collect();

        Ok(Page {
            limit: Some(limit as u64),
            offset: Some(offset as u64),
            page_count: Some(items.len() as u64),
            total_count: Some(total as u64),
            items,
        })
    }

    async fn get_tool(&self, name: &str) -> Result<ToolDefinition> {
        self.record(format!("get {}", name));
        self.tools
            .iter()
            .find(|t| t.qualified_name() == name)
            .cloned()
            .ok_or_else(|| AgentError::Arcade {
                status: 404,
                message: format!("tool {} not found", name),
            })
    }

    async fn authorize(&self, tool_name: &str, user_id: &str) -> Result<AuthorizationResponse> {
        self.record(format!("authorize {} {}", tool_name, user_id));
        if self.failing.contains(tool_name) {
            return Err(AgentError::Arcade {
                status: 500,
                message: "authorization service unavailable".to_string(),
            });
        }
        let status = self.next_status(tool_name);
        Ok(Self::auth_response(tool_name, status))
    }

    async fn auth_status(
        &self,
        authorization_id: &str,
        _wait_secs: u64,
    ) -> Result<AuthorizationResponse> {
        self.record(format!("status {}", authorization_id));
        let tool = authorization_id.trim_start_matches("auth-");
        let status = self.next_status(tool);
        if status == AuthorizationStatus::Pending {
            // Stand-in for the server holding the long poll open.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(Self::auth_response(tool, status))
    }

    async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        user_id: &str,
    ) -> Result<ExecuteToolResponse> {
        self.record(format!("execute {} {} {}", tool_name, user_id, input));
        Ok(ExecuteToolResponse {
            id: None,
            execution_id: None,
            success: Some(true),
            status: Some("success".to_string()),
            duration: None,
            output: Some(ToolOutput {
                value: Some(json!(format!("result of {}", tool_name))),
                error: None,
                authorization: None,
            }),
        })
    }
}

/// [`ChatModel`] that replays queued responses and records its requests.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| ModelResponse::text("Done.")))
    }
}
