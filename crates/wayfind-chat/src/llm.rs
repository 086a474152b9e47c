//! Completion provider abstraction and an OpenAI-compatible HTTP client.
//!
//! The router and composer only see [`CompletionProvider`]; tests swap in
//! scripted providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use wayfind_core::config::LlmConfig;
use wayfind_core::ConversationTurn;

use crate::error::ChatError;

/// One completion call: ordered messages plus the tools the model may call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    /// Function-tool definitions in the OpenAI `tools` shape.
    pub tools: Vec<Value>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ConversationTurn>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    /// Concatenated system messages, mostly for assertions.
    pub fn system_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == wayfind_core::Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    /// Raw JSON argument text, unvalidated.
    pub arguments: String,
}

/// The model's reply: text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            content: None,
            tool_calls: vec![ToolCall {
                id: None,
                name: name.into(),
                arguments: arguments.into(),
            }],
        }
    }

    /// Text content with surrounding whitespace removed; `None` when blank.
    pub fn trimmed_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ChatError>;
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    #[serde(skip_serializing_if = "<[Value]>::is_empty")]
    tools: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Parse a `chat/completions` response body into a [`Completion`].
///
/// Arguments are normally a JSON-encoded string; some providers send an
/// object instead, which is re-serialized so downstream parsing sees one
/// shape.
pub fn parse_completion(body: &str) -> Result<Completion, ChatError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::MalformedResponse(format!("unexpected completion payload: {}", e)))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::MalformedResponse("completion had no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: match call.function.arguments {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            },
        })
        .collect();

    Ok(Completion {
        content: choice.message.content,
        tool_calls,
    })
}

// =============================================================================
// HTTP client
// =============================================================================

/// Client for any endpoint speaking the OpenAI `chat/completions` protocol.
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl OpenAiCompatibleClient {
    /// Build a client from the `[llm]` section, reading the key from the
    /// configured environment variable.
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        Self::with_base_url(
            &config.base_url,
            &config.model,
            config.api_key(),
            config.timeout(),
        )
    }

    pub fn with_base_url(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ChatError::UpstreamUnavailable(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            timeout_secs: timeout.as_secs().max(1),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            tools: &request.tools,
            tool_choice: (!request.tools.is_empty()).then_some("auto"),
        };

        info!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Requesting completion"
        );

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await.map_err(|e| {
            error!(error = %e, "Completion request failed");
            ChatError::from_transport(&e, self.timeout_secs)
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ChatError::from_transport(&e, self.timeout_secs))?;
        if !status.is_success() {
            error!(status = status.as_u16(), "Completion provider returned error status");
            return Err(ChatError::UpstreamUnavailable(format!(
                "completion status {}",
                status.as_u16()
            )));
        }

        let completion = parse_completion(&text)?;
        debug!(
            has_content = completion.content.is_some(),
            tool_calls = completion.tool_calls.len(),
            "Completion received"
        );
        Ok(completion)
    }
}
