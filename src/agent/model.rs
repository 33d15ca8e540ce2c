//! Chat model abstraction and the OpenAI implementation.

use super::events::{Content, Part, Role};
use crate::error::{AgentError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Everything the model sees for one call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub instruction: String,
    /// Conversation history, oldest first.
    pub contents: Vec<Content>,
    pub tools: Vec<ChatCompletionTool>,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// What the model answered.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelResponse {
    /// A plain text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Content for the model event: text first, then one part per call.
    pub fn into_content(self) -> Content {
        let mut parts = Vec::with_capacity(self.tool_calls.len() + 1);
        if let Some(text) = self.text.filter(|t| !t.is_empty()) {
            parts.push(Part::text(text));
        }
        parts.extend(self.tool_calls.into_iter().map(|call| Part::FunctionCall {
            id: call.id,
            name: call.name,
            arguments: call.arguments,
        }));
        Content::new(Role::Model, parts)
    }
}

/// A model that can answer a conversation, optionally calling tools.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse>;
}

/// OpenAI Chat Completions model.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    pub fn new(model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
        })
    }
}

fn build_error(e: impl std::fmt::Display) -> AgentError {
    AgentError::Agent(e.to_string())
}

/// Render a request as OpenAI chat messages.
pub fn to_chat_messages(request: &ModelRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(request.instruction.clone())
            .build()
            .map_err(build_error)?
            .into(),
    ];

    for content in &request.contents {
        match content.role {
            Role::User => {
                messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(content.joined_text())
                        .build()
                        .map_err(build_error)?
                        .into(),
                );
            }
            Role::Model => {
                let text = content.joined_text();
                let tool_calls: Vec<ChatCompletionMessageToolCall> = content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::FunctionCall {
                            id,
                            name,
                            arguments,
                        } => Some(ChatCompletionMessageToolCall {
                            id: id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: name.clone(),
                                arguments: arguments.clone(),
                            },
                        }),
                        _ => None,
                    })
                    .collect();

                if text.is_empty() && tool_calls.is_empty() {
                    continue;
                }

                let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                if !text.is_empty() {
                    builder.content(text);
                }
                if !tool_calls.is_empty() {
                    builder.tool_calls(tool_calls);
                }
                messages.push(builder.build().map_err(build_error)?.into());
            }
            Role::Tool => {
                for part in &content.parts {
                    if let Part::FunctionResponse { id, response, .. } = part {
                        messages.push(
                            ChatCompletionRequestToolMessageArgs::default()
                                .tool_call_id(id.clone())
                                .content(response.clone())
                                .build()
                                .map_err(build_error)?
                                .into(),
                        );
                    }
                }
            }
        }
    }

    Ok(messages)
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.model, messages = request.contents.len())
    )]
    async fn complete(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let messages = to_chat_messages(request)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        // The API rejects an empty tools array.
        if !request.tools.is_empty() {
            builder.tools(request.tools.clone());
        }
        let chat_request = builder.build().map_err(build_error)?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| AgentError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Agent("No response from model".to_string()))?;

        let tool_calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!("Model returned {} tool call(s)", tool_calls.len());

        Ok(ModelResponse {
            text: choice.message.content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Content> {
        vec![
            Content::user_text("find cat videos"),
            Content::new(
                Role::Model,
                vec![Part::FunctionCall {
                    id: "call_1".into(),
                    name: "Youtube_SearchForVideos".into(),
                    arguments: r#"{"keywords":"cats"}"#.into(),
                }],
            ),
            Content::new(
                Role::Tool,
                vec![Part::FunctionResponse {
                    id: "call_1".into(),
                    name: "Youtube_SearchForVideos".into(),
                    response: "[]".into(),
                }],
            ),
            Content::new(Role::Model, vec![]),
            Content::new(Role::Model, vec![Part::text("No videos found.")]),
        ]
    }

    #[test]
    fn test_to_chat_messages() {
        let request = ModelRequest {
            instruction: "Be helpful.".into(),
            contents: history(),
            tools: Vec::new(),
        };

        let messages = to_chat_messages(&request).unwrap();
        // system, user, assistant(tool call), tool, assistant(text); empty model turn dropped
        assert_eq!(messages.len(), 5);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));

        match &messages[2] {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "Youtube_SearchForVideos");
                assert!(msg.content.is_none());
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }

        match &messages[3] {
            ChatCompletionRequestMessage::Tool(msg) => assert_eq!(msg.tool_call_id, "call_1"),
            other => panic!("Expected tool message, got {:?}", other),
        }

        assert!(matches!(messages[4], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_response_into_content() {
        let response = ModelResponse {
            text: Some("Searching now.".into()),
            tool_calls: vec![ToolCallRequest {
                id: "call_9".into(),
                name: "Youtube_SearchForVideos".into(),
                arguments: "{}".into(),
            }],
        };

        let content = response.into_content();
        assert_eq!(content.role, Role::Model);
        assert_eq!(content.parts.len(), 2);
        assert_eq!(content.parts[0].as_text(), Some("Searching now."));

        let empty = ModelResponse {
            text: Some(String::new()),
            tool_calls: Vec::new(),
        };
        assert!(empty.into_content().parts.is_empty());
    }
}
