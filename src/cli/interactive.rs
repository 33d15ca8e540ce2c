//! Console input shared by the chat loop and the confirmation prompt.

use super::Output;
use crate::agent::{BeforeToolCallback, ToolDecision, ToolInvocation};
use crate::tools::AuthPrompt;
use async_trait::async_trait;
use console::style;
use indicatif::ProgressBar;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Question asked before every tool call.
pub const CONFIRM_PROMPT: &str = "Do you approve this tool call? [y/n]: ";

/// Line source shared between readers; stdin must only be buffered once.
pub type SharedInput = Arc<Mutex<Box<dyn BufRead + Send>>>;

/// Shared, buffered stdin.
pub fn stdin_input() -> SharedInput {
    shared_input(BufReader::new(io::stdin()))
}

pub fn shared_input(reader: impl BufRead + Send + 'static) -> SharedInput {
    Arc::new(Mutex::new(Box::new(reader)))
}

/// Read one line including its terminator; `None` at end of input.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_line(input: &SharedInput) -> io::Result<Option<String>> {
    let mut reader = input.lock().unwrap_or_else(|e| e.into_inner());
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks the user on the console before each tool call.
pub struct ConsoleConfirmation<W> {
    input: SharedInput,
    output: Mutex<W>,
}

impl<W: Write + Send> ConsoleConfirmation<W> {
    pub fn new(input: SharedInput, output: W) -> Self {
        Self {
            input,
            output: Mutex::new(output),
        }
    }

    fn ask(&self, invocation: &ToolInvocation<'_>) -> io::Result<bool> {
        let args = serde_json::to_string_pretty(invocation.args)
            .unwrap_or_else(|_| invocation.args.to_string());

        {
            let mut out = self.output.lock().unwrap_or_else(|e| e.into_inner());
            writeln!(out, "Tool call: {}", invocation.tool_name)?;
            writeln!(out, "Arguments: {}", args)?;
            write!(out, "{}", CONFIRM_PROMPT)?;
            out.flush()?;
        }

        Ok(read_line(&self.input)?.is_some_and(|answer| is_yes(&answer)))
    }
}

#[async_trait]
impl<W: Write + Send> BeforeToolCallback for ConsoleConfirmation<W> {
    async fn before_tool(&self, invocation: &ToolInvocation<'_>) -> ToolDecision {
        match self.ask(invocation) {
            Ok(true) => ToolDecision::Allow,
            Ok(false) => ToolDecision::denied_by_user(invocation.tool_name),
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                ToolDecision::denied_by_user(invocation.tool_name)
            }
        }
    }
}

/// Shows authorization links without tearing the progress spinner.
pub struct ConsoleAuthPrompt {
    spinner: ProgressBar,
}

impl ConsoleAuthPrompt {
    pub fn new(spinner: ProgressBar) -> Self {
        Self { spinner }
    }
}

impl AuthPrompt for ConsoleAuthPrompt {
    fn authorization_required(&self, tool: &str, url: &str) {
        self.spinner.suspend(|| {
            Output::info(&format!(
                "Authorize {} at: {}",
                style(tool).bold(),
                style(url).underlined()
            ));
        });
        self.spinner
            .set_message(format!("Waiting for authorization of {}...", tool));
    }

    fn authorization_completed(&self, tool: &str) {
        self.spinner
            .suspend(|| Output::success(&format!("{} authorized", tool)));
    }
}
