//! The agent: a model, its instructions and the tools it may call.

use super::callbacks::BeforeToolCallback;
use super::model::ChatModel;
use crate::tools::ToolSet;
use std::sync::Arc;

/// Default cap on model calls per turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// A configured agent, ready to be driven by a [`Runner`](super::Runner).
pub struct Agent {
    name: String,
    description: String,
    instruction: String,
    model: Arc<dyn ChatModel>,
    tools: ToolSet,
    before_tool: Option<Arc<dyn BeforeToolCallback>>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(name: &str, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            instruction: String::new(),
            model,
            tools: ToolSet::default(),
            before_tool: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the system instruction sent with every model call.
    pub fn with_instruction(mut self, instruction: &str) -> Self {
        self.instruction = instruction.to_string();
        self
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    /// Run `callback` before every tool invocation.
    pub fn with_before_tool(mut self, callback: Arc<dyn BeforeToolCallback>) -> Self {
        self.before_tool = Some(callback);
        self
    }

    /// Set maximum iterations for the tool-calling loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn before_tool(&self) -> Option<&dyn BeforeToolCallback> {
        self.before_tool.as_deref()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("tools", &self.tools.names())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
