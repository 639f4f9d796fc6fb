//! Conversation state threaded through the workflow engine

use sable_ai::Message;

/// The mutable record owned by one task run. Created fresh per run, mutated
/// only by engine steps, discarded when the run terminates.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Conversation messages, append-only within a run
    pub messages: Vec<Message>,
    /// The user's goal, set at creation
    pub task: String,
    /// Number of model invocations so far
    pub iterations: u32,
    /// Iteration ceiling, fixed at construction
    pub max_iterations: u32,
    /// Whether a termination phrase was detected
    pub is_complete: bool,
    /// Result text of the most recent tool invocation
    pub last_tool_result: Option<String>,
    /// Terminal error from a model call or routing step
    pub error: Option<String>,
}

impl ConversationState {
    /// Create the initial state for a run
    pub fn new(task: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            messages: vec![],
            task: task.into(),
            iterations: 0,
            max_iterations,
            is_complete: false,
            last_tool_result: None,
            error: None,
        }
    }

    /// Merge a partial node update onto this state. New messages are
    /// concatenated, never replaced; scalar fields are overwritten only when
    /// the update supplies them.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(iterations) = update.iterations {
            self.iterations = iterations;
        }
        if let Some(is_complete) = update.is_complete {
            self.is_complete = is_complete;
        }
        if let Some(result) = update.last_tool_result {
            self.last_tool_result = Some(result);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
    }

    /// Whether the run must terminate: iteration exhaustion, a recorded
    /// error, or completion detection.
    pub fn is_terminal(&self) -> bool {
        self.iterations >= self.max_iterations || self.error.is_some() || self.is_complete
    }
}

/// Partial state update produced by a node: only the fields a node changed.
/// Omitted scalar fields retain their previous value on merge.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub iterations: Option<u32>,
    pub is_complete: Option<bool>,
    pub last_tool_result: Option<String>,
    pub error: Option<String>,
}

impl StateUpdate {
    /// An update that records a step-level error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}
