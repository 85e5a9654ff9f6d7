//! SMTP transport via lettre: port 587, STARTTLS, then AUTH.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::{MailCredentials, SmtpConfig};
use crate::mail::{MailTransport, OutgoingEmail, TransportError};

/// SMTP reply codes that mean the server refused our credentials.
const AUTH_FAILURE_CODES: &[&str] = &["530", "534", "535"];

/// Real mail transport. Opens one connection per send.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailTransport;

impl SmtpMailTransport {
    pub fn new() -> Self {
        Self
    }
}

impl MailTransport for SmtpMailTransport {
    fn send(
        &self,
        endpoint: &SmtpConfig,
        credentials: &MailCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), TransportError> {
        let message = build_message(&credentials.from_address, email)?;

        let creds = Credentials::new(
            credentials.username.clone(),
            credentials.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::starttls_relay(&endpoint.host)
            .map_err(|e| TransportError::Other(format!("SMTP relay error: {e}")))?
            .port(endpoint.port)
            .credentials(creds)
            .build();

        transport.send(&message).map_err(classify)?;

        tracing::info!(
            host = %endpoint.host,
            port = endpoint.port,
            to = %email.to,
            "Email submitted"
        );
        Ok(())
    }
}

/// Build a plain-text message with `From`, `To` and `Subject` set.
fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, TransportError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| TransportError::Other(format!("Invalid from address: {e}")))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| TransportError::Other(format!("Invalid to address: {e}")))?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| TransportError::Other(format!("Failed to build email: {e}")))
}

fn classify(err: lettre::transport::smtp::Error) -> TransportError {
    let is_auth = err
        .status()
        .map(|code| AUTH_FAILURE_CODES.contains(&code.to_string().as_str()))
        .unwrap_or(false);
    if is_auth {
        TransportError::Auth(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.into(),
            subject: "Report".into(),
            body: "Please send the Q4 report.".into(),
        }
    }

    #[test]
    fn builds_plain_text_message_with_headers() {
        let message = build_message("me@example.com", &email("a@b.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: me@example.com"));
        assert!(raw.contains("To: a@b.com"));
        assert!(raw.contains("Subject: Report"));
        assert!(raw.contains("text/plain"));
    }

    #[test]
    fn unparsable_recipient_is_transport_error() {
        let err = build_message("me@example.com", &email("a@")).unwrap_err();
        assert!(matches!(err, TransportError::Other(ref m) if m.contains("Invalid to address")));
    }

    #[test]
    fn sender_comes_from_from_address_not_login() {
        let creds = MailCredentials::new("apikey", "secret").with_from_address("alerts@example.com");
        let message = build_message(&creds.from_address, &email("a@b.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: alerts@example.com"));
        assert!(!raw.contains("apikey"));
    }

    #[test]
    fn unparsable_sender_is_transport_error() {
        let err = build_message("not an address", &email("a@b.com")).unwrap_err();
        assert!(matches!(err, TransportError::Other(ref m) if m.contains("Invalid from address")));
    }
}
