//! Error types for the career coach.

use std::time::Duration;

use crate::protocol::phase::Phase;

/// Top-level error type for the coach.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Input errors rejected at the session boundary. The session is left
/// unchanged when any of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Action {action} is not valid in phase {phase}")]
    InvalidAction { action: String, phase: Phase },

    #[error("A resume has already been loaded for this session")]
    DocumentAlreadyLoaded,

    #[error("The uploaded resume contained no text")]
    EmptyDocument,

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Document extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Document is not valid {format}: {reason}")]
    Unreadable { format: String, reason: String },

    #[error("Document contained no extractable text")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the coach.
pub type Result<T> = std::result::Result<T, Error>;
