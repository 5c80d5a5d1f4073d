use thiserror::Error;

/// Failures surfaced by a model client
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider rejected the credentials (401/403), or none were given
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// 429, with the provider's `retry-after` hint in seconds when present
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// 400 and 413
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// The event stream broke off or carried malformed framing
    #[error("Stream error: {message}")]
    Stream { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Reassembled tool arguments were not valid JSON for the named tool
    #[error("Failed to parse tool arguments for {tool_name}: {source}")]
    ToolArgumentParse {
        tool_name: String,
        source: serde_json::Error,
    },
}

impl LlmError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
