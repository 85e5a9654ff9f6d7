//! The email workflow: draft a message, have the model review it, then
//! either dispatch it or stop with revision feedback.

pub mod decision;
pub mod log;
pub mod orchestrator;
pub mod prompts;
pub mod state;

pub use decision::{REVISION_MARKER, Route, decide};
pub use log::{LogEntry, RunLog, StepOutcome};
pub use orchestrator::EmailWorkflow;
pub use state::{RunOutcome, RunPhase, RunState};
