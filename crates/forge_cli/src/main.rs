//! forge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or project layout
//! - 3: Build failure
//! - 5: Infrastructure error

use clap::Parser;
use forge_core::{PipelineError, PipelineFailure};
use forge_discovery::DiscoveryError;
use forge_iac::IacError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;
mod runner;

use commands::{Cli, Commands, Verbosity};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const BUILD_FAILURE: u8 = 3;
    pub const IAC_ERROR: u8 = 5;
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "forge=debug"
    } else if cli.quiet {
        "forge=error"
    } else {
        "forge=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", level)));

    // A second initialisation only happens in tests; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let verbosity = Verbosity { quiet: cli.quiet };
    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args, verbosity).await,
        Commands::Deploy(args) => commands::deploy::execute(args, verbosity).await,
        Commands::Destroy(args) => commands::destroy::execute(args, verbosity).await,
    };

    let code = match result {
        Ok(()) => ExitCodes::SUCCESS,
        Err(e) => {
            eprintln!("✗ Error: {}", render_error(&e));
            if let Some(hint) = remediation_hint(&e) {
                eprintln!("  {}", hint);
            }
            categorize_error(&e)
        }
    };

    // Exit without waiting on a prompt read abandoned by Ctrl-C.
    std::process::exit(i32::from(code));
}

/// The error and its causes on one line, skipping causes whose text the
/// message already shows.
fn render_error(e: &anyhow::Error) -> String {
    let mut message = e.to_string();
    for cause in e.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }
    message
}

fn pipeline_error(e: &anyhow::Error) -> Option<&PipelineError> {
    e.downcast_ref::<PipelineFailure>()
        .map(|f| &f.error)
        .or_else(|| e.downcast_ref::<PipelineError>())
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<IacError>().is_some() {
        return ExitCodes::IAC_ERROR;
    }

    match pipeline_error(e) {
        Some(PipelineError::Discovery(_))
        | Some(PipelineError::Config(_))
        | Some(PipelineError::InvalidState { .. }) => ExitCodes::INVALID_ARGS,
        Some(PipelineError::UnsupportedRuntime { .. })
        | Some(PipelineError::BuildFailed { .. })
        | Some(PipelineError::Stubs(_)) => ExitCodes::BUILD_FAILURE,
        Some(PipelineError::Executor { .. }) | Some(PipelineError::ApprovalDenied { .. }) => {
            ExitCodes::IAC_ERROR
        }
        Some(PipelineError::Cancelled) | Some(PipelineError::Io(_)) => ExitCodes::GENERAL_ERROR,
        None => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("not found") || msg.contains("invalid argument") {
                ExitCodes::INVALID_ARGS
            } else {
                ExitCodes::GENERAL_ERROR
            }
        }
    }
}

/// Suggest a next step for errors with an obvious fix.
fn remediation_hint(e: &anyhow::Error) -> Option<&'static str> {
    if matches!(e.downcast_ref::<IacError>(), Some(IacError::TerraformNotAvailable(_))) {
        return Some("Install Terraform or pass --terraform <path>.");
    }

    match pipeline_error(e)? {
        PipelineError::Discovery(DiscoveryError::NotFound(_)) => {
            Some("Create src/functions/<name>/ with a handler, or set project.functions_dir in forge.toml.")
        }
        PipelineError::Discovery(DiscoveryError::Empty(_)) => {
            Some("Add a handler file (main.go, index.js, handler.py, pom.xml, ...) to a function directory.")
        }
        PipelineError::UnsupportedRuntime { .. } => {
            Some("Supported runtime families: Go (provided.al2023), Node.js, Python, Java.")
        }
        PipelineError::ApprovalDenied { .. } => Some("Re-run with --auto-approve to skip confirmation."),
        PipelineError::Executor {
            source: IacError::StateLocked { .. },
            ..
        } => Some("Another run holds the state lock; wait for it or run `terraform force-unlock`."),
        _ => None,
    }
}
