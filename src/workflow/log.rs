//! Run Log — append-only record of what each step did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Step name of the drafting step.
pub const STEP_DRAFT: &str = "draft";

/// Step name of the review step.
pub const STEP_REVIEW: &str = "review";

/// Step name of the dispatch step.
pub const STEP_DISPATCH: &str = "dispatch";

/// Outcome recorded for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step did what it was asked. For dispatch: the model requested the
    /// send and the dispatcher reported success.
    Success,
    /// The step hit a recoverable problem: a draft that did not follow the
    /// required format, or a model-requested send that reported an error.
    Error,
    /// The step finished without a success/failure judgement (review).
    Complete,
    /// The send was synthesized from run state and succeeded.
    ForcedSuccess,
    /// The send was synthesized from run state and reported an error.
    ForcedError,
}

impl StepOutcome {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Complete => "complete",
            Self::ForcedSuccess => "forced_success",
            Self::ForcedError => "forced_error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::ForcedError)
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One step's record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub step: String,
    pub outcome: StepOutcome,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(step: impl Into<String>, outcome: StepOutcome, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            outcome,
            detail: detail.into(),
            recorded_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<10} {:<15} {}", self.step, self.outcome, self.detail)
    }
}

/// Ordered step records. `append` is the only mutator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: LogEntry) {
        tracing::debug!(
            step = %entry.step,
            outcome = entry.outcome.label(),
            detail = %entry.detail,
            "Step recorded"
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RunLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
