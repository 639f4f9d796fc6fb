//! Graph-backed agent facade

use futures::StreamExt;
use std::sync::Arc;

use sable_ai::ModelClient;

use crate::environment::Environment;
use crate::graph::{StepStream, WorkflowEngine};
use crate::state::ConversationState;
use crate::tool::ToolRegistry;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Ceiling on model invocations per run
    pub max_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_iterations: 30 }
    }
}

/// Thin behavioral wrapper over the workflow engine: creates a fresh
/// conversation state per run and logs human-readable progress.
pub struct GraphAgent {
    engine: WorkflowEngine,
    config: AgentConfig,
}

impl GraphAgent {
    pub fn new(
        client: Arc<dyn ModelClient>,
        environment: Arc<dyn Environment>,
        config: AgentConfig,
    ) -> Self {
        let registry = ToolRegistry::builtin(environment);
        Self {
            engine: WorkflowEngine::new(client, registry),
            config,
        }
    }

    fn initial_state(&self, task: &str) -> ConversationState {
        ConversationState::new(task, self.config.max_iterations)
    }

    /// Drive the task to a terminal outcome, logging each step
    pub async fn run(&self, task: &str) -> ConversationState {
        tracing::info!(task, "starting task");

        let mut final_state = self.initial_state(task);
        let mut stream = self.engine.stream(final_state.clone());

        while let Some((node, state)) = stream.next().await {
            tracing::info!(
                node = node.name(),
                iterations = state.iterations,
                messages = state.messages.len(),
                "step complete"
            );
            if let Some(ref error) = state.error {
                tracing::error!(error = %error, "run recorded an error");
            }
            final_state = state;
        }
        drop(stream);

        if final_state.is_complete {
            tracing::info!("task completed successfully");
        } else if final_state.error.is_some() {
            tracing::error!("task failed");
        } else if final_state.iterations >= final_state.max_iterations {
            tracing::warn!("maximum iterations reached");
        }

        final_state
    }

    /// Step-wise execution exposing every intermediate state snapshot
    pub fn run_stream(&self, task: &str) -> StepStream<'_> {
        self.engine.stream(self.initial_state(task))
    }

    /// Final state of a run: the last yielded step, or the initial state if
    /// the sequence were somehow empty.
    pub async fn get_state(&self, task: &str) -> ConversationState {
        let initial = self.initial_state(task);
        let mut last = None;

        let mut stream = self.engine.stream(initial.clone());
        while let Some((_, state)) = stream.next().await {
            last = Some(state);
        }
        drop(stream);

        last.unwrap_or(initial)
    }
}
