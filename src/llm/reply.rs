//! Classification of a model reply into free text or a structured action request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::provider::{ChatMessage, ToolCall, ToolCompletionResponse};

/// A structured instruction emitted by the model: which action to run, and with what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub target_action: String,
    pub arguments: BTreeMap<String, String>,
}

impl ActionRequest {
    pub fn new(target_action: impl Into<String>) -> Self {
        Self {
            target_action: target_action.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Convert a raw tool call. Returns `None` unless the call has a name and
    /// its arguments are a JSON object whose values are all scalars.
    pub fn from_tool_call(call: &ToolCall) -> Option<Self> {
        let name = call.name.trim();
        if name.is_empty() {
            return None;
        }

        // Some providers hand back the arguments as a JSON-encoded string.
        let decoded;
        let arguments = match &call.arguments {
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw).ok()?;
                &decoded
            }
            other => other,
        };

        let object = arguments.as_object()?;
        let mut mapped = BTreeMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            mapped.insert(key.clone(), text);
        }

        Some(Self {
            target_action: name.to_string(),
            arguments: mapped,
        })
    }

    /// Arguments as a JSON object, the shape tools take as parameters.
    pub fn arguments_json(&self) -> Value {
        Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// What the model said: either plain text or a request to run an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Text(String),
    ActionRequest {
        request: ActionRequest,
        /// Text the model sent alongside the request, if any.
        content: Option<String>,
    },
}

impl ModelReply {
    /// Build from a tool completion. Only the first tool call counts; a
    /// malformed first call degrades the reply to text.
    pub fn from_response(response: &ToolCompletionResponse) -> Self {
        Self::classify(response.content.as_deref(), &response.tool_calls)
    }

    /// Build from an assistant message recorded in the conversation.
    pub fn from_message(message: &ChatMessage) -> Self {
        let content = (!message.content.is_empty()).then_some(message.content.as_str());
        Self::classify(content, &message.tool_calls)
    }

    fn classify(content: Option<&str>, tool_calls: &[ToolCall]) -> Self {
        match tool_calls.first().and_then(ActionRequest::from_tool_call) {
            Some(request) => Self::ActionRequest {
                request,
                content: content.map(str::to_string),
            },
            None => Self::Text(content.unwrap_or_default().to_string()),
        }
    }

    /// The free-text part of the reply ("" when none).
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::ActionRequest { content, .. } => content.as_deref().unwrap_or_default(),
        }
    }

    pub fn action_request(&self) -> Option<&ActionRequest> {
        match self {
            Self::Text(_) => None,
            Self::ActionRequest { request, .. } => Some(request),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::ActionRequest { .. } => "action_request",
        }
    }
}
