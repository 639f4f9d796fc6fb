//! Tool trait and registry

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use sable_ai::ToolSpec;

use crate::environment::Environment;
use crate::tools::{BashTool, EditorTool};

/// Failure raised by a tool's execute function. Callers absorb these into
/// the conversation as formatted error messages; they never cross the node
/// boundary as exceptions.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ToolError(String);

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trait for executable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in API calls)
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> &str;

    /// JSON Schema for parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the supplied arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError>;
}

/// Type alias for a shared tool
pub type BoxedTool = Arc<dyn Tool>;

/// Fixed set of named capabilities available to the engine's tool step
pub struct ToolRegistry {
    tools: Vec<BoxedTool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<BoxedTool>) -> Self {
        Self { tools }
    }

    /// The built-in tool surface: bash and editor, bound to an environment
    pub fn builtin(environment: Arc<dyn Environment>) -> Self {
        Self::new(vec![
            Arc::new(BashTool::new(environment.clone())),
            Arc::new(EditorTool::new(environment)),
        ])
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Tool definitions to advertise to the model
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec::new(t.name(), t.description(), t.parameters_schema()))
            .collect()
    }

    /// Registered tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}
