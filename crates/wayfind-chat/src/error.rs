//! Error types for the conversational core.

use wayfind_core::error::WayfindError;
use wayfind_poi::PoiError;

/// Errors from one chat component (router, composer, completion client).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("conversation cannot be empty")]
    EmptyConversation,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("conversation exceeds maximum of {0} turns")]
    TooManyTurns(usize),
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("radius must be a positive number of meters")]
    InvalidRadius,
    #[error("model provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("malformed tool arguments: {0}")]
    MalformedToolArguments(String),
    #[error("model provider timed out after {0}s")]
    Timeout(u64),
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl ChatError {
    /// Classify a transport-level `reqwest` failure.
    pub fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ChatError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ChatError::MalformedResponse(err.to_string())
        } else {
            ChatError::UpstreamUnavailable(err.to_string())
        }
    }

    /// Whether the error describes a bad caller request rather than an
    /// upstream failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ChatError::EmptyConversation
                | ChatError::EmptyMessage
                | ChatError::MessageTooLong(_)
                | ChatError::TooManyTurns(_)
                | ChatError::InvalidLocation { .. }
                | ChatError::InvalidRadius
        )
    }
}

/// Failure of one orchestrated request, wrapping the first failing
/// component's error.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    Invalid(ChatError),
    #[error("intent routing failed: {0}")]
    Routing(ChatError),
    #[error("POI fetch failed: {0}")]
    Fetching(PoiError),
    #[error("answer composition failed: {0}")]
    Composing(ChatError),
}

impl RequestError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RequestError::Invalid(_))
    }

    /// Stable machine-readable code for logs and error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::Invalid(_) => "bad_request",
            RequestError::Routing(ChatError::Timeout(_))
            | RequestError::Composing(ChatError::Timeout(_))
            | RequestError::Fetching(PoiError::Timeout(_)) => "upstream_timeout",
            RequestError::Routing(ChatError::MalformedToolArguments(_)) => {
                "malformed_tool_arguments"
            }
            _ => "upstream_failure",
        }
    }
}

impl From<ChatError> for WayfindError {
    fn from(err: ChatError) -> Self {
        WayfindError::Chat(err.to_string())
    }
}

impl From<RequestError> for WayfindError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Fetching(e) => e.into(),
            other => WayfindError::Chat(other.to_string()),
        }
    }
}
