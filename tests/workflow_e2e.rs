//! End-to-end runs of the email workflow with a scripted model and a
//! recording mail transport (no network).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use email_agent::config::{MailCredentials, SmtpConfig, WorkflowConfig};
use email_agent::error::LlmError;
use email_agent::llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ToolCall,
    ToolCompletionRequest, ToolCompletionResponse,
};
use email_agent::mail::{MailDispatcher, MailTransport, OutgoingEmail, TransportError};
use email_agent::tools::ToolRegistry;
use email_agent::tools::builtin::SendEmailTool;
use email_agent::workflow::{EmailWorkflow, RunOutcome, RunPhase, RunState, StepOutcome};

/// Model stub: returns `draft` for the drafting call and the scripted reply
/// for the review call.
struct StubLlm {
    draft: String,
    review_text: Option<String>,
    review_calls: Vec<ToolCall>,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            content: self.draft.clone(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }

    async fn complete_with_tools(
        &self,
        _request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError> {
        Ok(ToolCompletionResponse {
            content: self.review_text.clone(),
            tool_calls: self.review_calls.clone(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: if self.review_calls.is_empty() {
                FinishReason::Stop
            } else {
                FinishReason::ToolUse
            },
        })
    }
}

/// Transport that records attempts instead of talking SMTP.
#[derive(Default)]
struct RecordingTransport {
    attempts: AtomicUsize,
    sent: Mutex<Vec<OutgoingEmail>>,
    reject_auth: bool,
}

impl MailTransport for RecordingTransport {
    fn send(
        &self,
        _endpoint: &SmtpConfig,
        _credentials: &MailCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.reject_auth {
            return Err(TransportError::Auth("535 5.7.8 Username and Password not accepted".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

const DRAFT: &str = "SUBJECT: Report\nBODY: Please send the Q4 report.";

async fn run_with(
    llm: StubLlm,
    transport: Arc<RecordingTransport>,
    credentials: MailCredentials,
    recipient: &str,
) -> RunState {
    let dispatcher = MailDispatcher::new(transport, SmtpConfig::default(), credentials);
    let tools = ToolRegistry::new();
    tools.register(Arc::new(SendEmailTool::new(dispatcher))).await;

    EmailWorkflow::new(Arc::new(llm), Arc::new(tools), WorkflowConfig::default())
        .run("ask for report", recipient)
        .await
        .expect("run should not abort")
}

fn creds() -> MailCredentials {
    MailCredentials::new("me@example.com", "app-password")
}

fn send_call(recipient: &str, subject: &str, body: &str) -> ToolCall {
    ToolCall {
        id: "toolu_01".into(),
        name: "send_email".into(),
        arguments: json!({"recipient": recipient, "subject": subject, "body": body}),
    }
}

#[tokio::test]
async fn scenario_a_explicit_action_request_sends() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: None,
        review_calls: vec![send_call("a@b.com", "Report", "Please send the Q4 report.")],
    };

    let state = run_with(llm, transport.clone(), creds(), "a@b.com").await;

    assert!(state.status.starts_with("SUCCESS:"));
    assert_eq!(state.status, "SUCCESS: Email titled 'Report' sent to a@b.com.");
    assert_eq!(state.logs().len(), 3);
    let steps: Vec<&str> = state.logs().iter().map(|e| e.step.as_str()).collect();
    assert_eq!(steps, vec!["draft", "review", "dispatch"]);
    assert_eq!(state.logs().entries()[2].outcome, StepOutcome::Success);
    assert!(matches!(state.outcome(), Some(RunOutcome::Sent { .. })));

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Report");
}

#[tokio::test]
async fn scenario_b_revision_marker_stops() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: Some("REVISION: tone too casual".into()),
        review_calls: vec![],
    };

    let state = run_with(llm, transport.clone(), creds(), "a@b.com").await;

    assert!(state.status.is_empty());
    assert_eq!(state.review_feedback.trim(), "tone too casual");
    assert_eq!(state.logs().len(), 2);
    assert_eq!(state.phase(), RunPhase::Stopped);
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
    assert_eq!(
        state.outcome(),
        Some(RunOutcome::RevisionRequested {
            feedback: "tone too casual".into()
        })
    );
}

#[tokio::test]
async fn scenario_c_ambiguous_review_forces_send() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: Some("Looks fine.".into()),
        review_calls: vec![],
    };

    let state = run_with(llm, transport.clone(), creds(), "a@b.com").await;

    assert_eq!(state.logs().len(), 3);
    assert_eq!(state.logs().entries()[2].outcome, StepOutcome::ForcedSuccess);
    let sent = transport.sent.lock().unwrap();
    assert_eq!(
        sent[0],
        OutgoingEmail {
            to: "a@b.com".into(),
            subject: "Report".into(),
            body: "Please send the Q4 report.".into(),
        }
    );
}

#[tokio::test]
async fn scenario_c_forced_send_with_missing_credentials() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: Some("Looks fine.".into()),
        review_calls: vec![],
    };

    let state = run_with(llm, transport.clone(), MailCredentials::new("", ""), "a@b.com").await;

    assert_eq!(state.status, "ERROR: credentials missing");
    assert_eq!(state.logs().entries()[2].outcome, StepOutcome::ForcedError);
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
    assert!(matches!(state.outcome(), Some(RunOutcome::SendFailed { .. })));
}

#[tokio::test]
async fn invalid_recipient_never_reaches_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: None,
        review_calls: vec![send_call("not-an-email", "Report", "Body")],
    };

    let state = run_with(llm, transport.clone(), creds(), "not-an-email").await;

    assert!(state.status.contains("invalid recipient"));
    assert_eq!(state.logs().entries()[2].outcome, StepOutcome::Error);
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auth_rejection_is_reported_as_status() {
    let transport = Arc::new(RecordingTransport {
        reject_auth: true,
        ..Default::default()
    });
    let llm = StubLlm {
        draft: DRAFT.into(),
        review_text: Some("Approved.".into()),
        review_calls: vec![],
    };

    let state = run_with(llm, transport.clone(), creds(), "a@b.com").await;

    assert!(state.status.starts_with("ERROR: SMTP Authentication failed"));
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(state.logs().entries()[2].outcome, StepOutcome::ForcedError);
}

#[tokio::test]
async fn malformed_draft_continues_into_review() {
    let transport = Arc::new(RecordingTransport::default());
    let llm = StubLlm {
        draft: "Hi! I'd write something like: please send the report.".into(),
        review_text: Some("REVISION: the draft has no subject".into()),
        review_calls: vec![],
    };

    let state = run_with(llm, transport, creds(), "a@b.com").await;

    let draft_entries: Vec<_> = state
        .logs()
        .iter()
        .filter(|e| e.step == "draft")
        .collect();
    assert_eq!(draft_entries.len(), 1);
    assert_eq!(draft_entries[0].outcome, StepOutcome::Error);
    assert_eq!(state.subject, "ERROR: Drafting Failed");
    assert_eq!(state.logs().entries()[1].step, "review");
    assert_eq!(state.review_feedback, "the draft has no subject");
}

#[tokio::test]
async fn decision_truth_table_end_to_end() {
    // (has action request, has marker) -> dispatched?
    let cases = [(true, true, true), (true, false, true), (false, true, false), (false, false, true)];

    for (has_request, has_marker, expect_dispatch) in cases {
        let transport = Arc::new(RecordingTransport::default());
        let llm = StubLlm {
            draft: DRAFT.into(),
            review_text: Some(if has_marker {
                "REVISION: shorten it".to_string()
            } else {
                "Reviewed.".to_string()
            }),
            review_calls: if has_request {
                vec![send_call("a@b.com", "Report", "Body")]
            } else {
                vec![]
            },
        };

        let state = run_with(llm, transport.clone(), creds(), "a@b.com").await;

        assert_eq!(state.dispatched(), expect_dispatch, "case {has_request}/{has_marker}");
        assert_eq!(state.logs().len(), if expect_dispatch { 3 } else { 2 });
        assert_eq!(
            transport.attempts.load(Ordering::SeqCst),
            usize::from(expect_dispatch)
        );
        if expect_dispatch {
            assert!(!state.review_feedback.contains("REVISION:"));
        }
    }
}
