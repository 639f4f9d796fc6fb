//! Workflow engine: the node graph and its drivers
//!
//! A small directed graph of named steps drives the conversation state to a
//! terminal outcome. The node set is a closed enum with an explicit
//! transition function, so there is no "unknown node" failure mode.

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

use sable_ai::{ModelClient, ToolSpec};

use crate::node;
use crate::state::{ConversationState, StateUpdate};
use crate::tool::ToolRegistry;

/// Named steps of the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Initialize,
    Model,
    Tools,
    CompletionCheck,
    End,
}

impl Node {
    /// Step name as exposed to streaming consumers and logs
    pub fn name(&self) -> &'static str {
        match self {
            Node::Initialize => "initialize",
            Node::Model => "model",
            Node::Tools => "tools",
            Node::CompletionCheck => "completion_check",
            Node::End => "end",
        }
    }
}

/// Lazy, finite, single-pass sequence of executed steps and the state each
/// one produced
pub type StepStream<'a> =
    Pin<Box<dyn Stream<Item = (Node, ConversationState)> + Send + 'a>>;

/// The state machine that sequences model calls, tool dispatch, completion
/// detection, and iteration/error limits.
pub struct WorkflowEngine {
    client: Arc<dyn ModelClient>,
    registry: ToolRegistry,
    specs: Vec<ToolSpec>,
}

impl WorkflowEngine {
    pub fn new(client: Arc<dyn ModelClient>, registry: ToolRegistry) -> Self {
        let specs = registry.specs();
        Self {
            client,
            registry,
            specs,
        }
    }

    async fn run_node(&self, node: Node, state: &ConversationState) -> StateUpdate {
        match node {
            Node::Initialize => node::initialize(state),
            Node::Model => node::model(state, self.client.as_ref(), &self.specs).await,
            Node::Tools => node::tools(state, &self.registry).await,
            Node::CompletionCheck => node::completion_check(state),
            Node::End => StateUpdate::default(),
        }
    }

    /// Select the next node. Terminal conditions (iteration exhaustion,
    /// recorded error, detected completion) override the static table, so a
    /// run that exceeds its limit in the model step ends without ever
    /// reaching the tools step.
    fn next_node(&self, node: Node, state: &ConversationState) -> Node {
        if state.is_terminal() {
            return Node::End;
        }
        match node {
            Node::Initialize => Node::Model,
            Node::Model => node::route_after_model(state),
            Node::Tools => Node::CompletionCheck,
            Node::CompletionCheck => Node::Model,
            Node::End => Node::End,
        }
    }

    /// Drive the state machine to the terminal node, discarding intermediate
    /// snapshots.
    pub async fn run(&self, mut state: ConversationState) -> ConversationState {
        let mut node = Node::Initialize;
        while node != Node::End {
            let update = self.run_node(node, &state).await;
            state.apply(update);
            node = self.next_node(node, &state);
        }
        state
    }

    /// Execute the same run step-wise, yielding `(node, state)` after each
    /// step and suspending until the consumer requests the next value.
    pub fn stream(&self, state: ConversationState) -> StepStream<'_> {
        Box::pin(async_stream::stream! {
            let mut state = state;
            let mut node = Node::Initialize;
            while node != Node::End {
                let update = self.run_node(node, &state).await;
                state.apply(update);
                yield (node, state.clone());
                node = self.next_node(node, &state);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Environment, LocalEnvironment};
    use async_trait::async_trait;
    use futures::StreamExt;
    use sable_ai::{Error as AiError, Message, ModelResponse, Result as AiResult, Role, ToolCall};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Model client that replays a fixed script of responses.
    struct ScriptedClient {
        responses: Mutex<Vec<AiResult<ModelResponse>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<AiResult<ModelResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        fn text(content: &str) -> AiResult<ModelResponse> {
            Ok(ModelResponse {
                content: content.to_string(),
                tool_calls: vec![],
            })
        }

        fn with_tools(content: &str, tool_calls: Vec<ToolCall>) -> AiResult<ModelResponse> {
            Ok(ModelResponse {
                content: content.to_string(),
                tool_calls,
            })
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[sable_ai::ToolSpec],
        ) -> AiResult<ModelResponse> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(ModelResponse {
                    content: "Task complete.".into(),
                    tool_calls: vec![],
                })
            } else {
                responses.remove(0)
            }
        }
    }

    fn engine(responses: Vec<AiResult<ModelResponse>>) -> (TempDir, WorkflowEngine) {
        let dir = TempDir::new().unwrap();
        let env: Arc<dyn Environment> = Arc::new(LocalEnvironment::new(dir.path()));
        let registry = ToolRegistry::builtin(env);
        let client = Arc::new(ScriptedClient::new(responses));
        (dir, WorkflowEngine::new(client, registry))
    }

    fn initial(max_iterations: u32) -> ConversationState {
        ConversationState::new("test task", max_iterations)
    }

    #[tokio::test]
    async fn test_run_completes_on_phrase() {
        let (_dir, engine) = engine(vec![ScriptedClient::text("All done, task complete.")]);
        let state = engine.run(initial(30)).await;

        assert!(state.is_complete);
        assert!(state.error.is_none());
        assert_eq!(state.iterations, 1);
        // system + task + assistant
        assert_eq!(state.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_run_executes_tools_then_completes() {
        let (_dir, engine) = engine(vec![
            ScriptedClient::with_tools(
                "",
                vec![ToolCall::new(
                    "c1",
                    "bash",
                    serde_json::json!({"command": "echo hello"}),
                )],
            ),
            ScriptedClient::text("The command ran. Task complete."),
        ]);
        let state = engine.run(initial(30)).await;

        assert!(state.is_complete);
        assert_eq!(state.iterations, 2);
        assert_eq!(state.last_tool_result.as_deref(), Some("hello\n"));
        let tool_msg = state
            .messages
            .iter()
            .find(|m| m.content.starts_with("Tool bash result:"))
            .expect("tool result folded into history as a user message");
        assert_eq!(tool_msg.role, Role::User);
    }

    #[tokio::test]
    async fn test_model_error_routes_to_end() {
        let (_dir, engine) = engine(vec![Err(AiError::api("server_error", "boom"))]);
        let state = engine.run(initial(30)).await;

        assert!(!state.is_complete);
        assert!(state.error.as_deref().unwrap().contains("Model invocation failed"));
        // The failed call still counts as an iteration
        assert_eq!(state.iterations, 1);
    }

    #[tokio::test]
    async fn test_max_iterations_one_ends_despite_tool_calls() {
        let (_dir, engine) = engine(vec![
            ScriptedClient::with_tools(
                "more to do",
                vec![ToolCall::new("c1", "bash", serde_json::json!({"command": "true"}))],
            ),
            ScriptedClient::text("should never be reached"),
        ]);
        let state = engine.run(initial(1)).await;

        assert_eq!(state.iterations, 1);
        assert!(!state.is_complete);
        assert!(state.error.is_none());
        // The tools step never ran
        assert!(state.last_tool_result.is_none());
    }

    #[tokio::test]
    async fn test_stream_yields_steps_in_order() {
        let (_dir, engine) = engine(vec![ScriptedClient::text("finished")]);
        let steps: Vec<(Node, ConversationState)> =
            engine.stream(initial(30)).collect().await;

        let names: Vec<&str> = steps.iter().map(|(n, _)| n.name()).collect();
        assert_eq!(names, vec!["initialize", "model", "completion_check"]);

        // Messages never shrink and iterations never decrease across steps
        for pair in steps.windows(2) {
            assert!(pair[1].1.messages.len() >= pair[0].1.messages.len());
            assert!(pair[1].1.iterations >= pair[0].1.iterations);
        }

        let (_, last) = steps.last().unwrap();
        assert!(last.is_complete);
    }

    #[tokio::test]
    async fn test_stream_and_run_agree() {
        let script = || {
            vec![
                ScriptedClient::with_tools(
                    "",
                    vec![ToolCall::new(
                        "c1",
                        "bash",
                        serde_json::json!({"command": "echo out"}),
                    )],
                ),
                ScriptedClient::text("Task complete."),
            ]
        };

        let (_dir_a, run_engine) = engine(script());
        let run_state = run_engine.run(initial(30)).await;

        let (_dir_b, stream_engine) = engine(script());
        let steps: Vec<_> = stream_engine.stream(initial(30)).collect().await;
        let (_, stream_state) = steps.last().unwrap();

        assert_eq!(run_state.is_complete, stream_state.is_complete);
        assert_eq!(run_state.error, stream_state.error);
        assert_eq!(run_state.iterations, stream_state.iterations);
        assert_eq!(run_state.messages.len(), stream_state.messages.len());
    }

    #[tokio::test]
    async fn test_iterations_increment_once_per_model_step() {
        let (_dir, engine) = engine(vec![
            ScriptedClient::text("working"),
            ScriptedClient::text("still working"),
            ScriptedClient::text("Task complete."),
        ]);
        let steps: Vec<_> = engine.stream(initial(30)).collect().await;

        let mut expected = 0;
        for (node, state) in &steps {
            if *node == Node::Model {
                expected += 1;
            }
            assert_eq!(state.iterations, expected);
        }
        assert_eq!(expected, 3);
    }

    #[tokio::test]
    async fn test_tools_step_error_terminates_on_next_check() {
        // Model claims tool calls but the assistant message carries none:
        // impossible through the normal path, so force it by scripting an
        // empty response followed by nothing. Instead exercise the malformed
        // entry through a state whose last message is not an assistant one.
        let (_dir, engine) = engine(vec![]);
        let mut state = initial(30);
        state.messages.push(Message::user("dangling"));

        let update = engine.run_node(Node::Tools, &state).await;
        assert!(update.error.is_some());
        state.apply(update);
        assert_eq!(engine.next_node(Node::Tools, &state), Node::End);
    }
}
