//! Node behaviors for the workflow engine
//!
//! Each node consumes the current state and produces a partial update with
//! only the fields it changed; the engine merges updates onto the state.

use sable_ai::{Message, ModelClient, Role, ToolSpec};

use crate::graph::Node;
use crate::state::{ConversationState, StateUpdate};
use crate::tool::ToolRegistry;

/// System instruction installed by the initialize node
pub const SYSTEM_PROMPT: &str = "You are a software engineering AI agent. Your task is to solve the given problem by:
1. Understanding the requirements
2. Writing code to implement the solution
3. Testing your implementation
4. Making corrections if needed

You have access to the following tools:
- bash: Execute shell commands
- editor: Read, write, and edit files

Work step by step and think carefully about each action.";

/// Substrings that signal task completion in assistant text
const COMPLETION_PHRASES: [&str; 4] = ["task complete", "done", "finished", "completed"];

/// Set up the system instruction and the task message; resets the iteration
/// counter and completion flag. Never fails.
pub fn initialize(state: &ConversationState) -> StateUpdate {
    StateUpdate {
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(&state.task)],
        iterations: Some(0),
        is_complete: Some(false),
        ..Default::default()
    }
}

/// Send the full history plus the tool schema set to the model and append
/// its response. A model failure is recorded as state, not raised, so the
/// engine can route to the terminal node deterministically; the iteration
/// counter advances either way.
pub async fn model(
    state: &ConversationState,
    client: &dyn ModelClient,
    tools: &[ToolSpec],
) -> StateUpdate {
    let iterations = Some(state.iterations + 1);

    match client.complete(&state.messages, tools).await {
        Ok(response) => {
            let messages = if response.is_empty() {
                vec![]
            } else {
                vec![response.into_message()]
            };
            StateUpdate {
                messages,
                iterations,
                ..Default::default()
            }
        }
        Err(e) => StateUpdate {
            error: Some(format!("Model invocation failed: {}", e)),
            iterations,
            ..Default::default()
        },
    }
}

/// Execute every tool call requested by the latest assistant message, in
/// request order. Unknown tools and failing calls produce synthetic error
/// messages in place of results and never abort the rest of the batch.
pub async fn tools(state: &ConversationState, registry: &ToolRegistry) -> StateUpdate {
    let Some(last) = state.messages.last().filter(|m| m.role == Role::Assistant) else {
        return StateUpdate::error("Expected assistant message with tool calls");
    };

    if last.tool_calls.is_empty() {
        return StateUpdate::error("No tool calls found in assistant message");
    }

    let mut update = StateUpdate::default();

    for call in &last.tool_calls {
        let Some(tool) = registry.get(&call.name) else {
            let error = format!("Unknown tool: {}", call.name);
            tracing::warn!(tool = %call.name, "unknown tool requested");
            update.messages.push(Message::user(format!("Tool error: {}", error)));
            update.last_tool_result = Some(error);
            continue;
        };

        tracing::debug!(tool = %call.name, id = %call.id, "executing tool");
        match tool.execute(call.arguments.clone()).await {
            Ok(result) => {
                update
                    .messages
                    .push(Message::user(format!("Tool {} result:\n{}", call.name, result)));
                update.last_tool_result = Some(result);
            }
            Err(e) => {
                let message = format!("Tool {} error: {}", call.name, e);
                update.messages.push(Message::user(message.clone()));
                update.last_tool_result = Some(message);
            }
        }
    }

    update
}

/// Scan history in reverse for the most recent assistant message and test it
/// against the fixed termination-phrase set, case-insensitively.
pub fn completion_check(state: &ConversationState) -> StateUpdate {
    let is_complete = state
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| {
            let text = m.content.to_lowercase();
            COMPLETION_PHRASES.iter().any(|phrase| text.contains(phrase))
        })
        .unwrap_or(false);

    StateUpdate {
        is_complete: Some(is_complete),
        ..Default::default()
    }
}

/// Model-exit decision: a recorded error terminates the run, a tool-carrying
/// assistant message routes to tool execution, anything else to the
/// completion check.
pub fn route_after_model(state: &ConversationState) -> Node {
    if state.error.is_some() {
        return Node::End;
    }
    match state.messages.last() {
        Some(m) if m.role == Role::Assistant && m.has_tool_calls() => Node::Tools,
        _ => Node::CompletionCheck,
    }
}
