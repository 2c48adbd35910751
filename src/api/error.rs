use thiserror::Error;

/// Failure of a single chat request. Every variant ends the exchange with an
/// inline error message; nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("cannot reach chat endpoint '{url}': {detail}")]
    Unreachable { url: String, detail: String },

    #[error("chat request to '{url}' timed out")]
    Timeout { url: String },

    #[error("chat endpoint '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("chat request to '{url}' failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("malformed chat reply: {0}")]
    MalformedReply(String),
}

impl ChatError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ChatError::MalformedReply(detail.into())
    }
}

pub(crate) fn map_api_request_error(error: reqwest::Error, request_url: &str) -> ChatError {
    let url = request_url.to_string();
    if error.is_timeout() {
        return ChatError::Timeout { url };
    }
    if error.is_connect() {
        return ChatError::Unreachable {
            url,
            detail: error.to_string(),
        };
    }
    if let Some(status) = error.status() {
        return ChatError::Status {
            url,
            status: status.as_u16(),
        };
    }
    if error.is_decode() {
        return ChatError::MalformedReply(error.to_string());
    }
    ChatError::Transport {
        url,
        detail: error.to_string(),
    }
}
