//! Runner driving the tool-calling loop for one conversational turn.

use super::callbacks::{ToolDecision, ToolInvocation};
use super::definition::Agent;
use super::events::{Content, Event, Part, Role};
use super::model::{ModelRequest, ToolCallRequest};
use super::session::SessionService;
use crate::error::{AgentError, Result};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs an agent against sessions held by a session service.
pub struct Runner {
    app_name: String,
    agent: Arc<Agent>,
    sessions: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(app_name: &str, agent: Arc<Agent>, sessions: Arc<dyn SessionService>) -> Self {
        Self {
            app_name: app_name.to_string(),
            agent,
            sessions,
        }
    }

    /// Run one turn for `message` and stream the agent's events.
    ///
    /// Nothing happens until the stream is polled; each poll advances the
    /// turn by one model call or one tool call. The user message is appended
    /// to the session but not yielded. An error ends the stream.
    pub fn run(
        &self,
        user_id: &str,
        session_id: &str,
        message: Content,
    ) -> BoxStream<'_, Result<Event>> {
        let turn = Turn {
            runner: self,
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            invocation_id: format!("e-{}", Uuid::new_v4()),
            iterations: 0,
            phase: Phase::Start(message),
        };

        stream::unfold(turn, |mut turn| async move {
            let item = turn.advance().await?;
            Some((item, turn))
        })
        .boxed()
    }
}

enum Phase {
    Start(Content),
    CallModel,
    RunTools(VecDeque<ToolCallRequest>),
    Done,
}

/// State of one in-flight turn.
struct Turn<'a> {
    runner: &'a Runner,
    user_id: String,
    session_id: String,
    invocation_id: String,
    iterations: usize,
    phase: Phase,
}

impl Turn<'_> {
    /// Produce the next event, or `None` once the turn is over.
    async fn advance(&mut self) -> Option<Result<Event>> {
        loop {
            // Any early return below leaves the turn `Done`.
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,
                Phase::Start(message) => {
                    if let Err(e) = self.begin(message).await {
                        return Some(Err(e));
                    }
                    self.phase = Phase::CallModel;
                }
                Phase::CallModel => return Some(self.call_model().await),
                Phase::RunTools(mut calls) => match calls.pop_front() {
                    Some(call) => {
                        let result = self.run_tool(call).await;
                        if result.is_ok() {
                            self.phase = Phase::RunTools(calls);
                        }
                        return Some(result);
                    }
                    None => self.phase = Phase::CallModel,
                },
            }
        }
    }

    async fn begin(&self, message: Content) -> Result<()> {
        let runner = self.runner;
        if runner
            .sessions
            .get_session(&runner.app_name, &self.user_id, &self.session_id)
            .await?
            .is_none()
        {
            return Err(AgentError::Agent(format!(
                "Session not found: {}",
                self.session_id
            )));
        }

        info!(
            "Starting turn {} for session {}",
            self.invocation_id, self.session_id
        );
        let event = Event::new(&self.invocation_id, "user", message);
        self.append(event).await
    }

    async fn call_model(&mut self) -> Result<Event> {
        let agent = self.runner.agent.as_ref();

        self.iterations += 1;
        if self.iterations > agent.max_iterations() {
            return Err(AgentError::Agent(format!(
                "Agent exceeded maximum iterations ({})",
                agent.max_iterations()
            )));
        }
        debug!("Agent iteration {}", self.iterations);

        let session = self
            .runner
            .sessions
            .get_session(&self.runner.app_name, &self.user_id, &self.session_id)
            .await?
            .ok_or_else(|| AgentError::Agent(format!("Session not found: {}", self.session_id)))?;

        let request = ModelRequest {
            instruction: agent.instruction().to_string(),
            contents: session.contents(),
            tools: agent.tools().function_tools(),
        };

        let response = agent.model().complete(&request).await?;
        let calls = response.tool_calls.clone();

        let event = Event::new(&self.invocation_id, agent.name(), response.into_content());
        self.append(event.clone()).await?;

        if !calls.is_empty() {
            self.phase = Phase::RunTools(calls.into());
        }
        Ok(event)
    }

    async fn run_tool(&self, call: ToolCallRequest) -> Result<Event> {
        let response = self.execute_tool(&call).await;
        let content = Content::new(
            Role::Tool,
            vec![Part::FunctionResponse {
                id: call.id,
                name: call.name,
                response,
            }],
        );

        let event = Event::new(&self.invocation_id, self.runner.agent.name(), content);
        self.append(event.clone()).await?;
        Ok(event)
    }

    /// Execute a tool call and return the text fed back to the model.
    ///
    /// Failures become result text so the model can recover within the turn.
    async fn execute_tool(&self, call: &ToolCallRequest) -> String {
        let agent = self.runner.agent.as_ref();

        let Some(tool) = agent.tools().resolve(&call.name) else {
            warn!("Model requested unknown tool {}", call.name);
            return format!("Unknown tool: {}", call.name);
        };

        let args: Value = if call.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(args) => args,
                Err(e) => return format!("Failed to parse arguments for {}: {}", call.name, e),
            }
        };

        let tool_name = tool.qualified_name();
        info!("Agent calling tool: {} with args: {}", tool_name, args);

        if let Some(callback) = agent.before_tool() {
            let invocation = ToolInvocation {
                tool_name: &tool_name,
                args: &args,
                user_id: &self.user_id,
            };
            if let ToolDecision::Deny { reason } = callback.before_tool(&invocation).await {
                info!("Tool call {} denied", tool_name);
                return reason;
            }
        }

        match agent.tools().execute(tool, args, &self.user_id).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        }
    }

    async fn append(&self, event: Event) -> Result<()> {
        self.runner
            .sessions
            .append_event(&self.runner.app_name, &self.user_id, &self.session_id, event)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{
        BeforeToolCallback, InMemorySessionService, ModelResponse, Session, ToolInvocation,
    };
    use crate::test_support::{tool_def, FakeProvider, ScriptedModel};
    use crate::tools::ToolSet;
    use async_trait::async_trait;
    use serde_json::Map;

    struct DenyAll;

    #[async_trait]
    impl BeforeToolCallback for DenyAll {
        async fn before_tool(&self, invocation: &ToolInvocation<'_>) -> ToolDecision {
            ToolDecision::denied_by_user(invocation.tool_name)
        }
    }

    struct Fixture {
        runner: Runner,
        model: Arc<ScriptedModel>,
        provider: Arc<FakeProvider>,
        sessions: Arc<InMemorySessionService>,
        session: Session,
    }

    async fn fixture(
        responses: Vec<ModelResponse>,
        configure: impl FnOnce(Agent) -> Agent,
    ) -> Fixture {
        let model = Arc::new(ScriptedModel::new(responses));
        let provider = Arc::new(FakeProvider::new(vec![]));
        let tools = ToolSet::new(
            provider.clone(),
            vec![
                tool_def("Youtube", "SearchForVideos"),
                tool_def("Youtube", "GetYoutubeVideoDetails"),
            ],
        );
        let agent = Agent::new("youtube_agent", model.clone())
            .with_instruction("Help with YouTube.")
            .with_tools(tools);
        let agent = Arc::new(configure(agent));

        let sessions = Arc::new(InMemorySessionService::new());
        let session = sessions
            .create_session("my_agent", "u1", Map::new())
            .await
            .unwrap();
        let runner = Runner::new("my_agent", agent, sessions.clone());

        Fixture {
            runner,
            model,
            provider,
            sessions,
            session,
        }
    }

    fn tool_call(id: &str, name: &str, arguments: &str) -> ModelResponse {
        ModelResponse {
            text: None,
            tool_calls: vec![ToolCallRequest {
                id: id.into(),
                name: name.into(),
                arguments: arguments.into(),
            }],
        }
    }

    fn tool_response(event: &Event) -> &str {
        match &event.content.as_ref().unwrap().parts[0] {
            Part::FunctionResponse { response, .. } => response,
            other => panic!("Expected function response, got {:?}", other),
        }
    }

    async fn collect(fx: &Fixture, text: &str) -> Vec<Result<Event>> {
        fx.runner
            .run("u1", &fx.session.id, Content::user_text(text))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_text_reply() {
        let fx = fixture(vec![ModelResponse::text("Hello!")], |a| a).await;

        let events = collect(&fx, "hi").await;
        assert_eq!(events.len(), 1);
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.display_line().as_deref(), Some("** youtube_agent: Hello!"));

        let requests = fx.model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instruction, "Help with YouTube.");
        assert_eq!(requests[0].contents, vec![Content::user_text("hi")]);
        assert_eq!(requests[0].tools.len(), 2);

        let session = fx
            .sessions
            .get_session("my_agent", "u1", &fx.session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.events.len(), 2);
        assert_eq!(session.events[0].author, "user");
        assert_eq!(session.events[0].invocation_id, session.events[1].invocation_id);
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let fx = fixture(
            vec![
                tool_call("call_1", "Youtube_SearchForVideos", r#"{"keywords":"cats"}"#),
                ModelResponse::text("Here are some cat videos."),
            ],
            |a| a,
        )
        .await;

        let events: Vec<Event> = collect(&fx, "find cat videos")
            .await
            .into_iter()
            .map(|e| e.unwrap())
            .collect();

        assert_eq!(events.len(), 3);
        assert!(events[0].text().is_none());
        assert_eq!(events[0].function_calls().count(), 1);
        assert_eq!(tool_response(&events[1]), "result of Youtube.SearchForVideos");
        assert_eq!(events[1].author, "youtube_agent");
        assert_eq!(events[2].text(), Some("Here are some cat videos."));

        assert_eq!(
            fx.provider.calls(),
            vec![r#"execute Youtube.SearchForVideos u1 {"keywords":"cats"}"#]
        );

        // The second model call sees the call and its result.
        let requests = fx.model.requests();
        assert_eq!(requests.len(), 2);
        let history = &requests[1].contents;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::Model);
        assert_eq!(history[2].role, Role::Tool);
    }

    #[tokio::test]
    async fn test_denied_call_is_not_executed() {
        let fx = fixture(
            vec![
                tool_call("call_1", "Youtube_SearchForVideos", r#"{"keywords":"cats"}"#),
                ModelResponse::text("Okay, I won't search."),
            ],
            |a| a.with_before_tool(Arc::new(DenyAll)),
        )
        .await;

        let events: Vec<Event> = collect(&fx, "find cat videos")
            .await
            .into_iter()
            .map(|e| e.unwrap())
            .collect();

        assert!(fx.provider.calls().is_empty());
        assert_eq!(
            tool_response(&events[1]),
            "The user denied permission to run Youtube.SearchForVideos."
        );
        assert_eq!(events[2].text(), Some("Okay, I won't search."));
    }

    #[tokio::test]
    async fn test_bad_calls_become_error_results() {
        let fx = fixture(
            vec![
                ModelResponse {
                    text: None,
                    tool_calls: vec![
                        ToolCallRequest {
                            id: "call_1".into(),
                            name: "Youtube_Nope".into(),
                            arguments: "{}".into(),
                        },
                        ToolCallRequest {
                            id: "call_2".into(),
                            name: "Youtube_SearchForVideos".into(),
                            arguments: "{not json".into(),
                        },
                    ],
                },
                ModelResponse::text("Sorry."),
            ],
            |a| a,
        )
        .await;

        let events: Vec<Event> = collect(&fx, "find cat videos")
            .await
            .into_iter()
            .map(|e| e.unwrap())
            .collect();

        assert_eq!(events.len(), 4);
        assert_eq!(tool_response(&events[1]), "Unknown tool: Youtube_Nope");
        assert!(tool_response(&events[2]).starts_with("Failed to parse arguments"));
        assert!(fx.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_iteration_cap_ends_with_error() {
        let fx = fixture(
            vec![
                tool_call("c1", "Youtube_SearchForVideos", "{}"),
                tool_call("c2", "Youtube_SearchForVideos", "{}"),
                tool_call("c3", "Youtube_SearchForVideos", "{}"),
            ],
            |a| a.with_max_iterations(2),
        )
        .await;

        let events = collect(&fx, "loop forever").await;
        assert_eq!(events.len(), 5);
        assert!(events[..4].iter().all(|e| e.is_ok()));
        match &events[4] {
            Err(AgentError::Agent(msg)) => assert!(msg.contains("maximum iterations (2)")),
            other => panic!("Expected iteration error, got {:?}", other),
        }
        assert_eq!(fx.model.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let fx = fixture(vec![], |a| a).await;

        let events: Vec<Result<Event>> = fx
            .runner
            .run("u1", "no-such-session", Content::user_text("hi"))
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(AgentError::Agent(_))));
        assert!(fx.model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let fx = fixture(vec![ModelResponse::text("Hello!")], |a| a).await;

        let mut stream = fx.runner.run("u1", &fx.session.id, Content::user_text("hi"));
        assert!(fx.model.requests().is_empty());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.text(), Some("Hello!"));
        assert_eq!(fx.model.requests().len(), 1);
        assert!(stream.next().await.is_none());
    }
}
