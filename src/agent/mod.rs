//! Agent system: a chat model with tools, driven turn by turn.
//!
//! An [`Agent`] bundles a model, an instruction and an authorized
//! [`ToolSet`](crate::tools::ToolSet). A [`Runner`] drives one conversational
//! turn against a [`Session`], calling the model and its tools until the
//! model answers without tool calls, and streams every step as an [`Event`].

mod callbacks;
mod definition;
mod events;
mod model;
mod runner;
pub mod session;

pub use callbacks::{AutoApprove, BeforeToolCallback, ToolDecision, ToolInvocation};
pub use definition::{Agent, DEFAULT_MAX_ITERATIONS};
pub use events::{Content, Event, Part, Role};
pub use model::{
    to_chat_messages, ChatModel, ModelRequest, ModelResponse, OpenAIChatModel, ToolCallRequest,
};
pub use runner::Runner;
pub use session::{InMemorySessionService, Session, SessionService};
