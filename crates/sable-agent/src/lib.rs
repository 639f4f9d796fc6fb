//! sable-agent: workflow engine and agent runtime
//!
//! This crate provides the node-based state machine that drives a language
//! model through iterative tool invocation until a software-engineering task
//! is judged complete, along with the built-in tool surface and the
//! environment abstraction the tools run against.

pub mod agent;
pub mod environment;
pub mod graph;
pub mod linear;
pub mod node;
pub mod state;
pub mod tool;
pub mod tools;

pub use agent::{AgentConfig, GraphAgent};
pub use environment::{Environment, ExecResult, LocalEnvironment};
pub use graph::{Node, StepStream, WorkflowEngine};
pub use linear::LinearAgent;
pub use state::{ConversationState, StateUpdate};
pub use tool::{BoxedTool, Tool, ToolError, ToolRegistry};
