//! Conversion of Arcade tool definitions into OpenAI function tools.

use super::types::{ToolDefinition, ValueSchema};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde_json::{json, Map, Value};

/// Map an Arcade value type to a JSON Schema type name.
fn json_type(val_type: &str) -> &'static str {
    match val_type {
        "string" => "string",
        "integer" => "integer",
        "number" => "number",
        "boolean" => "boolean",
        "array" => "array",
        // `json` and anything unrecognized are free-form objects.
        _ => "object",
    }
}

fn value_schema(schema: &ValueSchema, description: Option<&str>) -> Value {
    let mut property = Map::new();
    property.insert("type".into(), json!(json_type(&schema.val_type)));

    if let Some(description) = description {
        property.insert("description".into(), json!(description));
    }

    if let Some(values) = &schema.enum_values {
        if !values.is_empty() {
            property.insert("enum".into(), json!(values));
        }
    }

    if schema.val_type == "array" {
        let inner = schema.inner_val_type.as_deref().unwrap_or("string");
        property.insert("items".into(), json!({ "type": json_type(inner) }));
    }

    Value::Object(property)
}

/// Build the JSON Schema object describing a tool's input.
pub fn parameters_schema(tool: &ToolDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.input.parameters {
        properties.insert(
            param.name.clone(),
            value_schema(&param.value_schema, param.description.as_deref()),
        );
        if param.required {
            required.push(param.name.clone());
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Build the OpenAI function tool for an Arcade tool definition.
pub fn to_function_tool(tool: &ToolDefinition) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: tool.function_name(),
            description: tool.description.clone(),
            parameters: Some(parameters_schema(tool)),
            strict: None,
        },
    }
}
