//! sable-ai: model client layer for the sable agent
//!
//! Provides the message/tool-call data model, the `ModelClient` trait the
//! agent engine is driven by, and a concrete OpenAI-compatible
//! chat-completions client.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{ModelClient, OpenAiClient};
pub use error::{Error, Result};
pub use retry::{RetryOptions, retry};
pub use types::{Message, ModelResponse, Role, ToolCall, ToolSpec};
