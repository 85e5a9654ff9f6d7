//! Configuration types.
//!
//! Everything is read from the process environment once at startup. The
//! `from_lookup` constructors take the lookup function explicitly so tests
//! never touch the real environment.

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Default mail-submission host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default mail-submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Mail-submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
        }
    }
}

impl SmtpConfig {
    /// Build from `EMAIL_HOST` / `EMAIL_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("EMAIL_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let port = match lookup("EMAIL_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "EMAIL_PORT".into(),
                    message: format!("{raw:?} is not a port number: {e}"),
                })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self { host, port })
    }
}

/// Credentials for the mail-submission session.
///
/// Held only for the duration of a run; the password never appears in
/// `Debug` output. `from_address` goes into the `From` header and defaults
/// to the username, so providers whose login is not an address (an `apikey`
/// user, say) need `EMAIL_FROM_ADDRESS` set.
#[derive(Clone)]
pub struct MailCredentials {
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl MailCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            from_address: username.clone(),
            username,
            password: SecretString::from(password.into()),
        }
    }

    pub fn with_from_address(mut self, from_address: impl Into<String>) -> Self {
        self.from_address = from_address.into();
        self
    }

    /// Build from `SMTP_USERNAME` / `SMTP_APP_PASSWORD` / `EMAIL_FROM_ADDRESS`.
    /// Missing values become empty strings; the dispatcher rejects them later.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Self::new(
            lookup("SMTP_USERNAME").unwrap_or_default(),
            lookup("SMTP_APP_PASSWORD").unwrap_or_default(),
        );
        match lookup("EMAIL_FROM_ADDRESS").filter(|a| !a.trim().is_empty()) {
            Some(address) => credentials.with_from_address(address.trim()),
            None => credentials,
        }
    }

    /// Like [`MailCredentials::from_env`], but a missing app password is a
    /// startup error instead of a dispatch-time status.
    pub fn require_from_env() -> Result<Self, ConfigError> {
        Self::require_from_lookup(|key| std::env::var(key).ok())
    }

    pub fn require_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Self::from_lookup(lookup);
        if credentials.password.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "SMTP_APP_PASSWORD".to_string(),
                hint: "Set it to an app password for the SMTP_USERNAME account.".to_string(),
            });
        }
        Ok(credentials)
    }

    /// Both username and password are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("username", &self.username)
            .field("from_address", &self.from_address)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Tuning for the two model calls of a run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Temperature for the drafting call.
    pub draft_temperature: f32,
    /// Temperature for the review call (kept low, it is a decision).
    pub review_temperature: f32,
    /// Max tokens for either call.
    pub max_tokens: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            draft_temperature: 0.7,
            review_temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn smtp_defaults_when_unset() {
        let config = SmtpConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, SmtpConfig::default());
        assert_eq!(config.port, 587);
    }

    #[test]
    fn smtp_reads_host_and_port() {
        let config = SmtpConfig::from_lookup(lookup_from(&[
            ("EMAIL_HOST", "mail.example.org"),
            ("EMAIL_PORT", "2525"),
        ]))
        .unwrap();
        assert_eq!(config.host, "mail.example.org");
        assert_eq!(config.port, 2525);
    }

    #[test]
    fn smtp_rejects_bad_port() {
        let err = SmtpConfig::from_lookup(lookup_from(&[("EMAIL_PORT", "submission")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "EMAIL_PORT"));
    }

    #[test]
    fn credentials_completeness() {
        assert!(MailCredentials::new("me@example.com", "app-pass").is_complete());
        assert!(!MailCredentials::new("", "app-pass").is_complete());
        assert!(!MailCredentials::new("me@example.com", "").is_complete());

        let missing = MailCredentials::from_lookup(lookup_from(&[("SMTP_USERNAME", "me")]));
        assert!(!missing.is_complete());
    }

    #[test]
    fn blank_password_is_not_complete() {
        assert!(!MailCredentials::new("me@example.com", "   ").is_complete());
        assert!(!MailCredentials::new("  ", "app-pass").is_complete());
    }

    #[test]
    fn from_address_defaults_to_username() {
        let creds = MailCredentials::from_lookup(lookup_from(&[
            ("SMTP_USERNAME", "me@example.com"),
            ("SMTP_APP_PASSWORD", "app-pass"),
        ]));
        assert_eq!(creds.from_address, "me@example.com");

        let relay = MailCredentials::from_lookup(lookup_from(&[
            ("SMTP_USERNAME", "apikey"),
            ("SMTP_APP_PASSWORD", "SG.secret"),
            ("EMAIL_FROM_ADDRESS", " alerts@example.com "),
        ]));
        assert_eq!(relay.username, "apikey");
        assert_eq!(relay.from_address, "alerts@example.com");
    }

    #[test]
    fn require_reports_missing_app_password() {
        for pairs in [
            &[("SMTP_USERNAME", "me@example.com")][..],
            &[("SMTP_USERNAME", "me@example.com"), ("SMTP_APP_PASSWORD", " ")][..],
        ] {
            let err = MailCredentials::require_from_lookup(lookup_from(pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingRequired { ref key, .. } if key == "SMTP_APP_PASSWORD")
            );
        }

        let creds = MailCredentials::require_from_lookup(lookup_from(&[
            ("SMTP_USERNAME", "me@example.com"),
            ("SMTP_APP_PASSWORD", "app-pass"),
        ]))
        .unwrap();
        assert!(creds.is_complete());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = MailCredentials::new("me@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
