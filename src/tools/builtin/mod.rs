//! Built-in tools.

pub mod send_email;

pub use send_email::{SEND_EMAIL_TOOL, SendEmailTool};
