//! Arcade API request and response types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tool definition as returned by `GET /v1/tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Short tool name (`SearchForVideos`).
    pub name: String,
    /// Toolkit-qualified name (`Youtube.SearchForVideos`).
    #[serde(default)]
    pub qualified_name: String,
    /// Qualified name with version (`Youtube.SearchForVideos@1.0.0`).
    #[serde(default)]
    pub fully_qualified_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub toolkit: ToolkitInfo,
    #[serde(default)]
    pub input: ToolInput,
    #[serde(default)]
    pub requirements: Option<ToolRequirements>,
}

impl ToolDefinition {
    /// Name used when authorizing and executing the tool.
    pub fn qualified_name(&self) -> String {
        if self.qualified_name.is_empty() {
            format!("{}.{}", self.toolkit.name, self.name)
        } else {
            self.qualified_name.clone()
        }
    }

    /// Name exposed to the model; function names cannot contain dots.
    pub fn function_name(&self) -> String {
        self.qualified_name().replace('.', "_")
    }

    /// Whether the tool declares an authorization requirement.
    pub fn requires_authorization(&self) -> bool {
        self.requirements
            .as_ref()
            .is_some_and(|r| r.authorization.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub value_schema: ValueSchema,
    #[serde(default)]
    pub inferrable: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSchema {
    /// One of `string`, `integer`, `number`, `boolean`, `json`, `array`.
    pub val_type: String,
    #[serde(default)]
    pub inner_val_type: Option<String>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolRequirements {
    #[serde(default)]
    pub authorization: Option<AuthRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRequirement {
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_type: Option<String>,
    #[serde(default)]
    pub oauth2: Option<Value>,
}

/// Offset-paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub page_count: Option<u64>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeRequest<'a> {
    pub tool_name: &'a str,
    pub user_id: &'a str,
}

/// State of an authorization flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotStarted,
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthorizationStatus::NotStarted => "not_started",
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Completed => "completed",
            AuthorizationStatus::Failed => "failed",
            AuthorizationStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub status: AuthorizationStatus,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AuthorizationResponse {
    /// The user still has to complete a flow at `url`.
    pub fn is_pending(&self) -> bool {
        matches!(
            self.status,
            AuthorizationStatus::Pending | AuthorizationStatus::NotStarted
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteToolRequest<'a> {
    pub tool_name: &'a str,
    pub input: Value,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteToolResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub output: Option<ToolOutput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<ToolOutputError>,
    #[serde(default)]
    pub authorization: Option<AuthorizationResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutputError {
    pub message: String,
    #[serde(default)]
    pub additional_prompt_content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub can_retry: bool,
}

impl ExecuteToolResponse {
    /// Render the execution result as the text fed back to the model.
    pub fn result_text(&self) -> String {
        let Some(output) = &self.output else {
            return "Tool returned no output.".to_string();
        };

        if let Some(error) = &output.error {
            return match &error.additional_prompt_content {
                Some(extra) => format!("Tool error: {}\n{}", error.message, extra),
                None => format!("Tool error: {}", error.message),
            };
        }

        if let Some(auth) = &output.authorization {
            if auth.is_pending() {
                return format!(
                    "Authorization required: {}",
                    auth.url.as_deref().unwrap_or("no authorization URL provided")
                );
            }
        }

        match &output.value {
            Some(Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
            None => "Tool returned no output.".to_string(),
        }
    }
}
