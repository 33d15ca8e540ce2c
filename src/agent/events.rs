//! Conversation content and the events a runner emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

/// One part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text {
        text: String,
    },
    /// A tool call requested by the model. `arguments` is the raw JSON text.
    FunctionCall {
        id: String,
        name: String,
        arguments: String,
    },
    /// The result of a tool call, keyed by the call id.
    FunctionResponse {
        id: String,
        name: String,
        response: String,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// A user message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// All text parts joined with newlines.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single step of a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// Shared by every event of one turn.
    pub invocation_id: String,
    pub author: String,
    pub content: Option<Content>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(invocation_id: &str, author: &str, content: Content) -> Self {
        Self {
            id: Uuid::new_v4(),
            invocation_id: invocation_id.to_string(),
            author: author.to_string(),
            content: Some(content),
            timestamp: Utc::now(),
        }
    }

    /// Text of the first part, if that part is non-empty text.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(Part::as_text)
            .filter(|t| !t.is_empty())
    }

    /// Printable reply line, `None` for events without text.
    pub fn display_line(&self) -> Option<String> {
        self.text().map(|text| format!("** {}: {}", self.author, text))
    }

    /// Function calls carried by this event.
    pub fn function_calls(&self) -> impl Iterator<Item = &Part> {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| matches!(p, Part::FunctionCall { .. }))
    }
}
