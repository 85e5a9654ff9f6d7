//! The `Tool` trait: an action the model can ask the workflow to run.

use std::time::Duration;

use async_trait::async_trait;

pub use crate::error::ToolError;

/// Output of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Text result handed back to the workflow.
    pub content: String,
    /// Wall-clock time spent executing.
    pub duration: Duration,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: content.into(),
            duration,
        }
    }
}

/// An action exposed to the model through function calling.
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// Name the model uses to request this tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Read a required string parameter.
pub fn require_str<'a>(
    params: &'a serde_json::Value,
    key: &str,
    tool: &str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters {
            name: tool.to_string(),
            reason: format!("missing required string parameter '{key}'"),
        })
}
