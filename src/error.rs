//! Error types for the email agent.
//!
//! Only failures that abort a run live here. Mail delivery problems are
//! reported as status text by [`crate::mail::MailDispatcher`] instead.

/// Top-level error type for a workflow run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },
}

/// Errors raised by a dispatch action.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Tool {name} execution failed: {reason}")]
    ExecutionFailed { name: String, reason: String },
}

/// Failures of the orchestration itself. These abort the run.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("No dispatch action named {name} is configured")]
    NoDispatchTarget { name: String },

    #[error("Model requested unknown action {name}")]
    UnknownAction { name: String },
}

/// Result type alias for the agent.
pub type Result<T> = std::result::Result<T, Error>;
