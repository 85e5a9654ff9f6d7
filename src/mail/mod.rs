//! Mail Dispatcher — one synchronous send per call, outcome reported as text.
//!
//! Every expected failure (missing credentials, bad recipient, rejected
//! login, transport trouble) comes back as an `ERROR:` string rather than a
//! Rust error, so the workflow can record it as the run's status.

pub mod smtp;

pub use smtp::SmtpMailTransport;

use std::sync::Arc;

use crate::config::{MailCredentials, SmtpConfig};

/// Prefix of every successful dispatch status.
pub const SUCCESS_PREFIX: &str = "SUCCESS:";

/// Prefix of every failed dispatch status.
pub const ERROR_PREFIX: &str = "ERROR:";

pub const CREDENTIALS_MISSING: &str = "ERROR: credentials missing";

pub const INVALID_RECIPIENT: &str = "ERROR: invalid recipient address format";

pub const AUTH_FAILED: &str =
    "ERROR: SMTP Authentication failed. Check SMTP_USERNAME and SMTP_APP_PASSWORD.";

/// A plain-text email ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Failure reported by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

/// Something that can submit an email over an authenticated session.
pub trait MailTransport: Send + Sync {
    fn send(
        &self,
        endpoint: &SmtpConfig,
        credentials: &MailCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), TransportError>;
}

/// Whether a dispatch status reports success.
pub fn is_success(status: &str) -> bool {
    status.starts_with(SUCCESS_PREFIX)
}

/// Sends emails for a single run with fixed credentials and endpoint.
#[derive(Clone)]
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    endpoint: SmtpConfig,
    credentials: MailCredentials,
}

impl MailDispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        endpoint: SmtpConfig,
        credentials: MailCredentials,
    ) -> Self {
        Self {
            transport,
            endpoint,
            credentials,
        }
    }

    /// Dispatcher backed by the real SMTP transport.
    pub fn smtp(endpoint: SmtpConfig, credentials: MailCredentials) -> Self {
        Self::new(Arc::new(SmtpMailTransport::new()), endpoint, credentials)
    }

    pub fn endpoint(&self) -> &SmtpConfig {
        &self.endpoint
    }

    /// Attempt one send. Blocks until the transport returns.
    ///
    /// Preconditions are checked before any network activity.
    pub fn dispatch(&self, recipient: &str, subject: &str, body: &str) -> String {
        if !self.credentials.is_complete() {
            tracing::warn!("Dispatch refused: mail credentials missing");
            return CREDENTIALS_MISSING.to_string();
        }

        if !recipient.contains('@') {
            tracing::warn!(recipient, "Dispatch refused: recipient is not an address");
            return INVALID_RECIPIENT.to_string();
        }

        let email = OutgoingEmail {
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        tracing::debug!(
            host = %self.endpoint.host,
            port = self.endpoint.port,
            to = recipient,
            "Submitting email"
        );

        match self
            .transport
            .send(&self.endpoint, &self.credentials, &email)
        {
            Ok(()) => format!("SUCCESS: Email titled '{subject}' sent to {recipient}."),
            Err(TransportError::Auth(reason)) => {
                tracing::error!(reason = %reason, "SMTP authentication failed");
                AUTH_FAILED.to_string()
            }
            Err(TransportError::Other(reason)) => {
                tracing::error!(reason = %reason, "SMTP send failed");
                format!("ERROR: Failed to send email via SMTP. Details: {reason}")
            }
        }
    }
}

impl std::fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailDispatcher")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
