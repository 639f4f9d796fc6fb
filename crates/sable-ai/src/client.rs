//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    retry::{RetryOptions, retry},
    types::{Message, ModelResponse, ToolCall, ToolSpec},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Capability required by the agent's model step: given the conversation
/// history and the advertised tool set, produce text and zero or more
/// tool-call requests. Failures must surface as `Err`, never as a malformed
/// response.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelResponse>;
}

/// Chat-completions client for OpenAI and OpenAI-compatible endpoints
/// (LiteLLM proxies and similar, via a custom base URL).
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    retry_options: RetryOptions,
}

impl OpenAiClient {
    /// Create a new client against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            retry_options: RetryOptions::default(),
        }
    }

    /// Create from the OPENAI_API_KEY environment variable
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key, model))
    }

    /// Point the client at a different OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the retry policy applied to each completion request
    pub fn with_retry_options(mut self, retry_options: RetryOptions) -> Self {
        self.retry_options = retry_options;
        self
    }

    async fn send(&self, request: &ChatRequest) -> Result<ModelResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(Error::RateLimited { retry_after });
            }
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_str(), text));
        }

        let completion: ChatResponse = response.json().await?;
        parse_response(completion)
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolSpec]) -> ChatRequest {
        let messages = messages.iter().map(convert_message).collect();

        let tools: Option<Vec<ChatTool>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ChatTool {
                        tool_type: "function".to_string(),
                        function: ChatFunction {
                            name: t.name.clone(),
                            description: Some(t.description.clone()),
                            parameters: Some(t.parameters.clone()),
                        },
                    })
                    .collect(),
            )
        };

        let has_tools = tools.is_some();
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
            tools,
            tool_choice: if has_tools {
                Some(serde_json::json!("auto"))
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelResponse> {
        let request = self.build_request(messages, tools);

        tracing::debug!(model = %self.model, messages = messages.len(), "sending completion request");

        retry(self.retry_options.clone(), || self.send(&request)).await
    }
}

fn convert_message(msg: &Message) -> ChatMessage {
    let tool_calls = if msg.tool_calls.is_empty() {
        None
    } else {
        Some(
            msg.tool_calls
                .iter()
                .map(|call| ChatToolCall {
                    id: call.id.clone(),
                    call_type: "function".to_string(),
                    function: ChatFunctionCall {
                        name: call.name.clone(),
                        arguments: serde_json::to_string(&call.arguments).unwrap_or_default(),
                    },
                })
                .collect(),
        )
    };

    ChatMessage {
        role: msg.role.as_str().to_string(),
        content: if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        },
        tool_calls,
    }
}

fn parse_response(completion: ChatResponse) -> Result<ModelResponse> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("no choices in completion".into()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let arguments = serde_json::from_str(&call.function.arguments)?;
            Ok(ToolCall::new(call.id, call.function.name, arguments))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ModelResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}
