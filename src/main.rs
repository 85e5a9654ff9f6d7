use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use email_agent::config::{MailCredentials, SmtpConfig, WorkflowConfig};
use email_agent::llm::{LlmConfig, create_provider};
use email_agent::mail::MailDispatcher;
use email_agent::tools::ToolRegistry;
use email_agent::tools::builtin::SendEmailTool;
use email_agent::workflow::{EmailWorkflow, RunOutcome, RunState};

/// Draft an email with an LLM, let the model review it, and send it over
/// SMTP when approved.
#[derive(Parser, Debug)]
#[command(name = "email-agent")]
#[command(version)]
#[command(about = "Draft, review and send one email with an LLM.", long_about = None)]
struct Cli {
    /// Address the email goes to
    recipient: String,

    /// What the email should accomplish, e.g. "ask Sarah for the Q4 report"
    #[arg(required = true, num_args = 1..)]
    goal: Vec<String>,
}

impl Cli {
    fn goal(&self) -> String {
        self.goal.join(" ")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli.recipient, &cli.goal()).await {
        Ok(state) => {
            print_report(&state);
            match state.outcome() {
                Some(RunOutcome::SendFailed { .. }) | None => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Err(e) => {
            eprintln!("Error: agent run failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(recipient: &str, goal: &str) -> anyhow::Result<RunState> {
    // Both secrets are required up front in this mode.
    let llm_config = LlmConfig::from_env().context("language model is not configured")?;
    let credentials =
        MailCredentials::require_from_env().context("mail credentials are not configured")?;
    let smtp = SmtpConfig::from_env().context("mail endpoint is not configured")?;

    eprintln!("📧 Email Agent v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   SMTP: {}:{}", smtp.host, smtp.port);
    eprintln!("   Sender: {}\n", credentials.from_address);

    let llm = create_provider(&llm_config)?;

    let tools = Arc::new(ToolRegistry::new());
    tools
        .register(Arc::new(SendEmailTool::new(MailDispatcher::smtp(
            smtp,
            credentials,
        ))))
        .await;

    let workflow = EmailWorkflow::new(llm, tools, WorkflowConfig::default());
    Ok(workflow.run(goal, recipient).await?)
}

fn print_report(state: &RunState) {
    println!("Execution log");
    println!("{:<10} {:<15} {}", "STEP", "OUTCOME", "DETAIL");
    for entry in state.logs() {
        println!("{entry}");
    }
    println!();

    match state.outcome() {
        Some(RunOutcome::Sent { status }) => {
            println!("✅ Email sent");
            println!("{status}");
        }
        Some(RunOutcome::SendFailed { status }) => {
            println!("❌ Send failed");
            println!("{status}");
        }
        Some(RunOutcome::RevisionRequested { feedback }) => {
            println!("⚠️  Draft needs revision; nothing was sent");
            if feedback.is_empty() {
                println!("The reviewer gave no reason. Try a more detailed goal.");
            } else {
                println!("Feedback: {feedback}");
            }
        }
        None => println!("Run ended in phase {}", state.phase()),
    }

    println!();
    println!("Subject: {}", state.subject);
    println!("{}", state.body);
}
