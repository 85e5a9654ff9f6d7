//! Prompts for the draft and review calls, and the draft format parser.

use super::decision::REVISION_MARKER;

/// Subject sentinel recorded when the draft cannot be parsed.
pub const DRAFT_FAILED_SUBJECT: &str = "ERROR: Drafting Failed";

const SUBJECT_PREFIX: &str = "SUBJECT:";

/// Separator between the subject and body parts of a draft.
const BODY_DELIMITER: &str = "\nBODY:";

/// Instruction for the drafting call.
pub fn draft_system_prompt() -> String {
    "\
You are a professional Email Drafting Agent. Write a concise, professional email \
subject and body based on the user's goal.
Your entire response MUST start with 'SUBJECT:' followed by the subject, then a newline, \
followed by 'BODY:' followed by the full email body. Do not include any other text."
        .to_string()
}

pub fn draft_user_prompt(goal: &str, recipient: &str) -> String {
    format!("GOAL: {goal}\nRECIPIENT: {recipient}")
}

/// Instruction for the review call.
pub fn review_system_prompt(send_tool: &str) -> String {
    format!(
        "\
You are the Email Orchestrator. Review the draft for professionalism and completeness. \
You have only two possible actions. The primary goal is to send a good email.

ACTION 1: SEND EMAIL
If the draft is professional, complete, and ready to go, you MUST call the `{send_tool}` tool, \
providing the exact `recipient`, `subject`, and `body`.

ACTION 2: REQUEST REVISION
If the draft is lacking, unprofessional, or incomplete, you MUST respond ONLY with \
'{REVISION_MARKER}' followed by your concise reason. DO NOT call the tool.

DECISION PRIORITY: Use ACTION 1 if the email is acceptable. Only use ACTION 2 if it's genuinely bad."
    )
}

pub fn review_user_prompt(recipient: &str, subject: &str, body: &str) -> String {
    format!("Recipient: {recipient}\nDraft Subject: {subject}\n\nDraft Body:\n---\n{body}\n---")
}

/// Split a `SUBJECT: ...\nBODY: ...` draft into (subject, body).
///
/// Splits on the first `\nBODY:`; returns `None` when it is absent.
pub fn parse_draft(raw: &str) -> Option<(String, String)> {
    let (subject_part, body_part) = raw.split_once(BODY_DELIMITER)?;
    let subject_part = subject_part.trim();
    let subject = subject_part
        .strip_prefix(SUBJECT_PREFIX)
        .unwrap_or(subject_part)
        .trim();
    Some((subject.to_string(), body_part.trim().to_string()))
}
