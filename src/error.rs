//! Error types for docq.

use thiserror::Error;

/// Primary error type for all docq operations.
#[derive(Error, Debug)]
pub enum DocqError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown function: {0}")]
    UnknownTool(String),

    #[error("Missing required parameter '{parameter}' for tool '{tool}'")]
    MissingArgument { tool: String, parameter: String },

    #[error("Tool execution error in {tool}: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Run ended in {status}: {message}")]
    RunFailed { status: String, message: String },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Agent initialization failed: {0}")]
    AgentInitialization(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DocqError {
    /// Create an API error from a status code and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DocqError>;
