//! Run State — everything one workflow invocation knows and produces.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::llm::{ChatMessage, ModelReply, Role};
use crate::mail;
use crate::workflow::log::{LogEntry, RunLog};

/// Where a run is in Draft → Review → (Dispatch | Stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Start,
    Drafted,
    Reviewed,
    Dispatched,
    Stopped,
}

impl RunPhase {
    /// Check if this phase allows transitioning to another phase.
    pub fn can_transition_to(&self, target: RunPhase) -> bool {
        use RunPhase::*;

        matches!(
            (self, target),
            (Start, Drafted) | (Drafted, Reviewed) | (Reviewed, Dispatched) | (Reviewed, Stopped)
        )
    }

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dispatched | Self::Stopped)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Drafted => "drafted",
            Self::Reviewed => "reviewed",
            Self::Dispatched => "dispatched",
            Self::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// The user-visible result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Sent { status: String },
    SendFailed { status: String },
    RevisionRequested { feedback: String },
}

/// State of a single run. Owned by the workflow; dropped with the result.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub run_id: Uuid,
    goal: String,
    recipient: String,
    pub subject: String,
    pub body: String,
    /// Empty means "proceed to dispatch"; otherwise the revision reason.
    pub review_feedback: String,
    /// Empty until a dispatch attempt; then its `SUCCESS:`/`ERROR:` text.
    pub status: String,
    phase: RunPhase,
    logs: RunLog,
    conversation: Vec<ChatMessage>,
    pub started_at: DateTime<Utc>,
}

impl RunState {
    pub fn new(goal: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            goal: goal.into(),
            recipient: recipient.into(),
            subject: String::new(),
            body: String::new(),
            review_feedback: String::new(),
            status: String::new(),
            phase: RunPhase::Start,
            logs: RunLog::new(),
            conversation: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn logs(&self) -> &RunLog {
        &self.logs
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    pub(crate) fn record(&mut self, entry: LogEntry) {
        self.logs.append(entry);
    }

    pub(crate) fn push_message(&mut self, message: ChatMessage) {
        self.conversation.push(message);
    }

    pub(crate) fn advance(&mut self, to: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(to),
            "invalid run transition {} -> {}",
            self.phase,
            to
        );
        tracing::debug!(run_id = %self.run_id, from = %self.phase, to = %to, "Run phase changed");
        self.phase = to;
    }

    /// The most recent assistant message, classified.
    pub fn latest_reply(&self) -> Option<ModelReply> {
        self.conversation
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(ModelReply::from_message)
    }

    /// Whether a dispatch attempt was made.
    pub fn dispatched(&self) -> bool {
        !self.status.is_empty()
    }

    /// Classify a finished run. `None` while the run is still in progress.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            RunPhase::Dispatched if mail::is_success(&self.status) => Some(RunOutcome::Sent {
                status: self.status.clone(),
            }),
            RunPhase::Dispatched => Some(RunOutcome::SendFailed {
                status: self.status.clone(),
            }),
            RunPhase::Stopped => Some(RunOutcome::RevisionRequested {
                feedback: self.review_feedback.clone(),
            }),
            _ => None,
        }
    }
}
