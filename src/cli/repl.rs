//! The interactive chat loop.

use super::interactive::{read_line, SharedInput};
use super::Output;
use crate::agent::{Content, Runner};
use crate::error::Result;
use futures::StreamExt;
use std::io::Write;
use tracing::{debug, warn};

/// Typed to leave the loop.
const EXIT_COMMAND: &str = "exit";

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// The user typed `exit`.
    Exit,
    /// Input was closed.
    Eof,
}

/// Reads user lines, forwards them to the runner and prints the replies.
pub struct ChatLoop<'a, W> {
    runner: &'a Runner,
    user_id: String,
    session_id: String,
    input: SharedInput,
    out: W,
}

impl<'a, W: Write> ChatLoop<'a, W> {
    pub fn new(
        runner: &'a Runner,
        user_id: &str,
        session_id: &str,
        input: SharedInput,
        out: W,
    ) -> Self {
        Self {
            runner,
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            input,
            out,
        }
    }

    /// Run until the user exits or input ends.
    ///
    /// Turn failures are reported on stderr and the loop keeps going; only
    /// console I/O errors end it early.
    pub async fn run(&mut self) -> Result<LoopEnd> {
        loop {
            write!(self.out, "User: ")?;
            self.out.flush()?;

            let Some(line) = read_line(&self.input)? else {
                debug!("Input closed");
                return Ok(LoopEnd::Eof);
            };

            let text = line.trim();
            if text.eq_ignore_ascii_case(EXIT_COMMAND) {
                writeln!(self.out, "Goodbye!")?;
                return Ok(LoopEnd::Exit);
            }
            if text.is_empty() {
                continue;
            }

            self.turn(text).await?;
        }
    }

    /// Forward one message and drain the reply stream.
    async fn turn(&mut self, text: &str) -> Result<()> {
        let runner = self.runner;
        let mut events = runner.run(&self.user_id, &self.session_id, Content::user_text(text));

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if let Some(line) = event.display_line() {
                        writeln!(self.out, "{}", line)?;
                    }
                }
                Err(e) => {
                    warn!("Turn failed: {}", e);
                    Output::error(&e.to_string());
                }
            }
        }

        self.out.flush()?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{
        Agent, InMemorySessionService, ModelResponse, SessionService, ToolCallRequest,
    };
    use crate::cli::interactive::shared_input;
    use crate::test_support::{tool_def, FakeProvider, ScriptedModel};
    use crate::tools::ToolSet;
    use serde_json::Map;
    use std::io::Cursor;
    use std::sync::Arc;

    struct Harness {
        runner: Runner,
        model: Arc<ScriptedModel>,
        provider: Arc<FakeProvider>,
        session_id: String,
    }

    async fn harness(responses: Vec<ModelResponse>) -> Harness {
        let model = Arc::new(ScriptedModel::new(responses));
        let provider = Arc::new(FakeProvider::new(vec![]));
        let tools = ToolSet::new(
            provider.clone(),
            vec![
                tool_def("Youtube", "SearchForVideos"),
                tool_def("Youtube", "GetYoutubeVideoDetails"),
            ],
        );
        let agent = Agent::new("youtube_agent", model.clone()).with_tools(tools);

        let sessions = Arc::new(InMemorySessionService::new());
        let session = sessions
            .create_session("my_agent", "u1", Map::new())
            .await
            .unwrap();

        Harness {
            runner: Runner::new("my_agent", Arc::new(agent), sessions),
            model,
            provider,
            session_id: session.id,
        }
    }

    async fn run_loop(h: &Harness, input: &'static str) -> (LoopEnd, String) {
        let mut chat = ChatLoop::new(
            &h.runner,
            "u1",
            &h.session_id,
            shared_input(Cursor::new(input)),
            Vec::new(),
        );
        let end = chat.run().await.unwrap();
        (end, String::from_utf8(chat.into_output()).unwrap())
    }

    #[tokio::test]
    async fn test_exit_is_case_insensitive() {
        for word in ["exit\n", "Exit\n", "EXIT\n", "  exit  \n"] {
            let h = harness(vec![]).await;
            let (end, out) = run_loop(&h, word).await;

            assert_eq!(end, LoopEnd::Exit);
            assert_eq!(out, "User: Goodbye!\n");
            assert!(h.model.requests().is_empty());
        }
    }

    #[tokio::test]
    async fn test_eof_ends_without_farewell() {
        let h = harness(vec![]).await;
        let (end, out) = run_loop(&h, "").await;
        assert_eq!(end, LoopEnd::Eof);
        assert_eq!(out, "User: ");
    }

    #[tokio::test]
    async fn test_blank_lines_are_ignored() {
        let h = harness(vec![]).await;
        let (_, out) = run_loop(&h, "\n   \nexit\n").await;
        assert_eq!(out, "User: User: User: Goodbye!\n");
        assert!(h.model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_one_message_forwarded_per_line() {
        let h = harness(vec![ModelResponse::text("Hi there."), ModelResponse::text("Bye.")]).await;
        let (_, out) = run_loop(&h, "hello\nthanks\nexit\n").await;

        assert_eq!(
            out,
            "User: ** youtube_agent: Hi there.\nUser: ** youtube_agent: Bye.\nUser: Goodbye!\n"
        );
        let requests = h.model.requests();
        assert_eq!(requests.len(), 2);
        // The second turn sees the whole first exchange.
        assert_eq!(requests[1].contents.len(), 3);
    }

    #[tokio::test]
    async fn test_find_cat_videos_scenario() {
        let h = harness(vec![
            ModelResponse {
                text: None,
                tool_calls: vec![ToolCallRequest {
                    id: "call_1".into(),
                    name: "Youtube_SearchForVideos".into(),
                    arguments: r#"{"keywords":"cat videos"}"#.into(),
                }],
            },
            ModelResponse::text("Here are some cat videos."),
        ])
        .await;

        let (end, out) = run_loop(&h, "find cat videos\nexit\n").await;

        assert_eq!(end, LoopEnd::Exit);
        // Tool call and tool result events carry no text and print nothing.
        assert_eq!(
            out,
            "User: ** youtube_agent: Here are some cat videos.\nUser: Goodbye!\n"
        );
        assert_eq!(
            h.provider.calls(),
            vec![r#"execute Youtube.SearchForVideos u1 {"keywords":"cat videos"}"#]
        );
        assert_eq!(out.matches("Goodbye!").count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_loop() {
        let h = harness(vec![
            ModelResponse::text("Odd input."),
            ModelResponse::text("Hi."),
        ])
        .await;
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        bytes.extend_from_slice(b"hello\nexit\n");
        let mut chat = ChatLoop::new(
            &h.runner,
            "u1",
            &h.session_id,
            shared_input(Cursor::new(bytes)),
            Vec::new(),
        );

        assert_eq!(chat.run().await.unwrap(), LoopEnd::Exit);
        let out = String::from_utf8(chat.into_output()).unwrap();
        assert_eq!(
            out,
            "User: ** youtube_agent: Odd input.\nUser: ** youtube_agent: Hi.\nUser: Goodbye!\n"
        );
        assert_eq!(h.model.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_turn_error_does_not_end_loop() {
        let h = harness(vec![ModelResponse::text("unused")]).await;
        // Session id that does not exist makes every turn fail.
        let mut chat = ChatLoop::new(
            &h.runner,
            "u1",
            "missing",
            shared_input(Cursor::new("hello\nexit\n")),
            Vec::new(),
        );

        assert_eq!(chat.run().await.unwrap(), LoopEnd::Exit);
        let out = String::from_utf8(chat.into_output()).unwrap();
        assert_eq!(out, "User: User: Goodbye!\n");
        assert!(h.model.requests().is_empty());
    }
}
