//! Decision Policy — turns the review reply into exactly one route.
//!
//! Evaluated in order, first match wins:
//! 1. A well-formed action request → dispatch with the model's arguments.
//! 2. Text containing [`REVISION_MARKER`] → stop, keeping what follows it.
//! 3. Anything else → dispatch with arguments rebuilt from run state.
//!
//! Rule 3 sends whatever the reviewer did not explicitly reject.

use crate::llm::{ActionRequest, ModelReply};

/// Marker the reviewer uses to reject a draft.
pub const REVISION_MARKER: &str = "REVISION:";

/// Where the run goes after review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Run the action the model asked for, with its arguments.
    DispatchExplicit(ActionRequest),
    /// End the run without sending.
    StopForRevision { feedback: String },
    /// Send using the run's own recipient, subject and body.
    DispatchSynthesized,
}

impl Route {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DispatchExplicit(_) => "dispatch_explicit",
            Self::StopForRevision { .. } => "stop_for_revision",
            Self::DispatchSynthesized => "dispatch_synthesized",
        }
    }

    pub fn dispatches(&self) -> bool {
        !matches!(self, Self::StopForRevision { .. })
    }
}

/// Pick the route for a review reply.
pub fn decide(reply: &ModelReply) -> Route {
    if let Some(request) = reply.action_request() {
        return Route::DispatchExplicit(request.clone());
    }

    match revision_feedback(reply.text()) {
        Some(feedback) => Route::StopForRevision { feedback },
        None => Route::DispatchSynthesized,
    }
}

/// Text after the first revision marker, trimmed. `None` without a marker.
pub fn revision_feedback(text: &str) -> Option<String> {
    text.find(REVISION_MARKER)
        .map(|idx| text[idx + REVISION_MARKER.len()..].trim().to_string())
}
