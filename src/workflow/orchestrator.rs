//! Workflow Orchestrator — Draft → Review → (Dispatch | Stop).
//!
//! Steps run strictly in sequence, each awaiting its model or mail call
//! before the next begins. Model failures and unusable dispatch targets abort
//! the run with an `Err`; everything else ends in a terminal `RunState`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::{Error, WorkflowError};
use crate::llm::{
    ActionRequest, ChatMessage, CompletionRequest, LlmProvider, ModelReply, ToolCompletionRequest,
};
use crate::mail;
use crate::tools::ToolRegistry;
use crate::tools::builtin::SEND_EMAIL_TOOL;
use crate::workflow::decision::{self, Route};
use crate::workflow::log::{LogEntry, STEP_DISPATCH, STEP_DRAFT, STEP_REVIEW, StepOutcome};
use crate::workflow::prompts::{self, DRAFT_FAILED_SUBJECT};
use crate::workflow::state::{RunPhase, RunState};

/// Characters of the subject quoted in the draft log entry.
const SUBJECT_PREVIEW_CHARS: usize = 40;

/// Drives one email run. Dependencies are passed in; nothing is global.
pub struct EmailWorkflow {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: WorkflowConfig,
}

impl EmailWorkflow {
    pub fn new(llm: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: WorkflowConfig) -> Self {
        Self { llm, tools, config }
    }

    /// Run the full workflow for one goal and recipient.
    pub async fn run(&self, goal: &str, recipient: &str) -> Result<RunState, Error> {
        let mut state = RunState::new(goal, recipient);
        info!(
            run_id = %state.run_id,
            recipient,
            model = self.llm.model_name(),
            "Starting email run"
        );

        self.draft(&mut state).await?;
        self.review(&mut state).await?;

        let reply = state
            .latest_reply()
            .unwrap_or_else(|| ModelReply::Text(String::new()));
        let route = decision::decide(&reply);
        debug!(run_id = %state.run_id, route = route.label(), "Review routed");

        match route {
            Route::DispatchExplicit(request) => {
                state.review_feedback.clear();
                self.dispatch(&mut state, request, false).await?;
            }
            Route::DispatchSynthesized => {
                state.review_feedback.clear();
                let request = synthesize_request(&state);
                self.dispatch(&mut state, request, true).await?;
            }
            Route::StopForRevision { feedback } => {
                state.review_feedback = feedback;
                state.advance(RunPhase::Stopped);
            }
        }

        info!(
            run_id = %state.run_id,
            phase = %state.phase(),
            steps = state.logs().len(),
            "Email run finished"
        );
        Ok(state)
    }

    /// Ask the model for a `SUBJECT:`/`BODY:` draft. A malformed draft is
    /// recorded, not raised.
    async fn draft(&self, state: &mut RunState) -> Result<(), Error> {
        let system = ChatMessage::system(prompts::draft_system_prompt());
        let user = ChatMessage::user(prompts::draft_user_prompt(state.goal(), state.recipient()));

        let request = CompletionRequest::new(vec![system.clone(), user.clone()])
            .with_temperature(self.config.draft_temperature)
            .with_max_tokens(self.config.max_tokens);
        let response = self.llm.complete(request).await?;
        let raw = response.content;

        let entry = match prompts::parse_draft(&raw) {
            Some((subject, body)) => {
                let preview: String = subject.chars().take(SUBJECT_PREVIEW_CHARS).collect();
                state.subject = subject;
                state.body = body;
                LogEntry::new(
                    STEP_DRAFT,
                    StepOutcome::Success,
                    format!("Subject drafted: {preview}..."),
                )
            }
            None => {
                warn!(run_id = %state.run_id, "Draft did not follow SUBJECT:/BODY: format");
                state.subject = DRAFT_FAILED_SUBJECT.to_string();
                state.body = raw;
                LogEntry::new(
                    STEP_DRAFT,
                    StepOutcome::Error,
                    "LLM response did not follow strict SUBJECT:/BODY: format.",
                )
            }
        };

        state.push_message(system);
        state.push_message(user);
        let summary = format!("Subject: {}\nBody: {}", state.subject, state.body);
        state.push_message(ChatMessage::assistant(summary));
        state.record(entry);
        state.advance(RunPhase::Drafted);
        Ok(())
    }

    /// Ask the model to either call the send tool or reply with the
    /// revision marker. Always logs `Complete`.
    async fn review(&self, state: &mut RunState) -> Result<(), Error> {
        let system = ChatMessage::system(prompts::review_system_prompt(SEND_EMAIL_TOOL));
        let user = ChatMessage::user(prompts::review_user_prompt(
            state.recipient(),
            &state.subject,
            &state.body,
        ));

        let tools = self.tools.tool_definitions().await;
        let request = ToolCompletionRequest::new(vec![system.clone(), user.clone()], tools)
            .with_temperature(self.config.review_temperature)
            .with_max_tokens(self.config.max_tokens);
        let response = self.llm.complete_with_tools(request).await?;

        let reply = ModelReply::from_response(&response);
        let detail = match reply.action_request() {
            Some(request) => format!("Decided to: call {}", request.target_action),
            None => "Decided to: give feedback".to_string(),
        };
        debug!(run_id = %state.run_id, reply = reply.label(), "Review reply received");

        state.review_feedback = reply.text().to_string();
        state.push_message(system);
        state.push_message(user);
        state.push_message(ChatMessage::assistant_with_tool_calls(
            response.content,
            response.tool_calls,
        ));
        state.record(LogEntry::new(STEP_REVIEW, StepOutcome::Complete, detail));
        state.advance(RunPhase::Reviewed);
        Ok(())
    }

    /// Run the dispatch action once and store its result as the status.
    async fn dispatch(
        &self,
        state: &mut RunState,
        request: ActionRequest,
        synthesized: bool,
    ) -> Result<(), Error> {
        let tool = match self.tools.get(&request.target_action).await {
            Some(tool) => tool,
            None if synthesized => {
                return Err(WorkflowError::NoDispatchTarget {
                    name: request.target_action,
                }
                .into());
            }
            None => {
                return Err(WorkflowError::UnknownAction {
                    name: request.target_action,
                }
                .into());
            }
        };

        info!(
            run_id = %state.run_id,
            action = %request.target_action,
            synthesized,
            "Dispatching"
        );

        let status = match tool.execute(request.arguments_json()).await {
            Ok(output) if output.content.trim().is_empty() => {
                format!("{} Dispatch action returned no status.", mail::ERROR_PREFIX)
            }
            Ok(output) => output.content,
            Err(e) => {
                warn!(run_id = %state.run_id, error = %e, "Dispatch action failed");
                format!("{} Dispatch action failed. Details: {e}", mail::ERROR_PREFIX)
            }
        };

        let succeeded = mail::is_success(&status);
        let (outcome, detail) = match (synthesized, succeeded) {
            (false, true) => (StepOutcome::Success, format!("Tool output: {status}")),
            (false, false) => (StepOutcome::Error, format!("Tool output: {status}")),
            (true, true) => (
                StepOutcome::ForcedSuccess,
                format!("Tool call was synthesized and executed: {status}"),
            ),
            (true, false) => (
                StepOutcome::ForcedError,
                format!("Synthesized tool call did not succeed: {status}"),
            ),
        };

        state.status = status;
        state.record(LogEntry::new(STEP_DISPATCH, outcome, detail));
        state.advance(RunPhase::Dispatched);
        Ok(())
    }
}

/// Send arguments rebuilt from the run's own recipient and draft.
fn synthesize_request(state: &RunState) -> ActionRequest {
    ActionRequest::new(SEND_EMAIL_TOOL)
        .with_argument("recipient", state.recipient())
        .with_argument("subject", state.subject.clone())
        .with_argument("body", state.body.clone())
}
