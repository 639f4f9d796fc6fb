//! Legacy linear agent
//!
//! The pre-graph reference behavior: a plain loop without named nodes. It
//! shares the tool-execution and completion semantics of the workflow
//! engine but handles a model-call failure by folding it back into the
//! conversation as a continuation prompt instead of recording a terminal
//! error.

use std::sync::Arc;

use sable_ai::{Message, ModelClient, ToolSpec};

use crate::agent::AgentConfig;
use crate::environment::Environment;
use crate::node::SYSTEM_PROMPT;
use crate::tool::ToolRegistry;

/// Phrases the linear variant tests for when a turn produces no tool calls
const COMPLETION_PHRASES: [&str; 2] = ["task complete", "done"];

/// Linear (non-graph) agent variant
pub struct LinearAgent {
    client: Arc<dyn ModelClient>,
    registry: ToolRegistry,
    specs: Vec<ToolSpec>,
    config: AgentConfig,
    messages: Vec<Message>,
}

impl LinearAgent {
    pub fn new(
        client: Arc<dyn ModelClient>,
        environment: Arc<dyn Environment>,
        config: AgentConfig,
    ) -> Self {
        let registry = ToolRegistry::builtin(environment);
        let specs = registry.specs();
        Self {
            client,
            registry,
            specs,
            config,
            messages: vec![],
        }
    }

    /// Conversation history of the most recent run
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run the loop until completion is detected or iterations are exhausted
    pub async fn run(&mut self, task: &str) {
        tracing::info!(task, "starting task");

        self.messages = vec![Message::system(SYSTEM_PROMPT), Message::user(task)];

        let mut iterations = 0u32;
        while iterations < self.config.max_iterations {
            iterations += 1;
            tracing::info!(
                iteration = iterations,
                max = self.config.max_iterations,
                "running iteration"
            );

            match self.client.complete(&self.messages, &self.specs).await {
                Ok(response) => {
                    if !response.content.is_empty() {
                        self.messages.push(Message::assistant(&response.content));
                    }

                    if response.has_tool_calls() {
                        for call in &response.tool_calls {
                            let Some(tool) = self.registry.get(&call.name) else {
                                tracing::error!(tool = %call.name, "unknown tool");
                                continue;
                            };

                            tracing::info!(tool = %call.name, "executing tool");
                            match tool.execute(call.arguments.clone()).await {
                                Ok(result) => self.messages.push(Message::user(format!(
                                    "Tool {} result:\n{}",
                                    call.name, result
                                ))),
                                Err(e) => {
                                    tracing::error!(tool = %call.name, error = %e, "tool error");
                                    self.messages.push(Message::user(format!(
                                        "Tool {} error: {}",
                                        call.name, e
                                    )));
                                }
                            }
                        }
                    } else {
                        let text = response.content.to_lowercase();
                        if COMPLETION_PHRASES.iter().any(|p| text.contains(p)) {
                            tracing::info!("task completed successfully");
                            return;
                        }
                    }
                }
                Err(e) => {
                    // Soft continuation: the failure becomes a prompt, not a
                    // terminal condition
                    tracing::error!(error = %e, "model call failed");
                    self.messages.push(Message::user(format!(
                        "Error occurred: {}. Please continue or try a different approach.",
                        e
                    )));
                }
            }
        }

        tracing::warn!("maximum iterations reached");
    }
}
