//! Email agent — drafts an email with an LLM, lets the model review it, and
//! sends it over SMTP when approved.

pub mod config;
pub mod error;
pub mod llm;
pub mod mail;
pub mod tools;
pub mod workflow;
