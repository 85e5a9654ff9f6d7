//! `send_email` tool — lets the model dispatch the drafted email.
//!
//! The tool never fails on delivery problems: whatever the dispatcher
//! reports (`SUCCESS: ...` or `ERROR: ...`) is returned as the output text.

use std::time::Instant;

use async_trait::async_trait;

use crate::mail::MailDispatcher;
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Name the model uses to request a send.
pub const SEND_EMAIL_TOOL: &str = "send_email";

/// Sends one plain-text email through the configured dispatcher.
#[derive(Debug)]
pub struct SendEmailTool {
    dispatcher: MailDispatcher,
}

impl SendEmailTool {
    pub fn new(dispatcher: MailDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        SEND_EMAIL_TOOL
    }

    fn description(&self) -> &str {
        "Send an email to a specified recipient using secure SMTP credentials. \
         Returns SUCCESS or an ERROR message."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "recipient": {
                    "type": "string",
                    "description": "Email address of the recipient"
                },
                "subject": {
                    "type": "string",
                    "description": "Subject line"
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text email body"
                }
            },
            "required": ["recipient", "subject", "body"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let recipient = require_str(&params, "recipient", SEND_EMAIL_TOOL)?.to_string();
        let subject = require_str(&params, "subject", SEND_EMAIL_TOOL)?.to_string();
        let body = require_str(&params, "body", SEND_EMAIL_TOOL)?.to_string();

        // SMTP is blocking I/O; keep it off the async workers.
        let dispatcher = self.dispatcher.clone();
        let status =
            tokio::task::spawn_blocking(move || dispatcher.dispatch(&recipient, &subject, &body))
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    name: SEND_EMAIL_TOOL.to_string(),
                    reason: format!("dispatch task panicked: {e}"),
                })?;

        Ok(ToolOutput::text(status, start.elapsed()))
    }
}
