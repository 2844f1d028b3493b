//! Terminal output and prompts.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use forge_core::{ApprovalPrompt, EventLevel, EventObserver, StageEvent};
use forge_iac::Outputs;
use tracing::warn;

/// Print events as stages finish. Quiet mode keeps warnings and errors only.
pub fn event_printer(quiet: bool) -> EventObserver {
    Arc::new(move |event: &StageEvent| {
        match event.level {
            EventLevel::Warning | EventLevel::Error => eprintln!("{}", event),
            _ if quiet => {}
            _ => println!("{}", event),
        }
    })
}

/// Render infrastructure outputs as `name = value` lines, sorted by name.
pub fn format_outputs(outputs: &Outputs) -> String {
    outputs
        .iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => format!("{} = {}", name, s),
            other => format!("{} = {}", name, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks on the terminal. Only an explicit "yes" approves.
///
/// Without a terminal on both stdin and stderr the prompt refuses, so
/// unattended runs must pass `--auto-approve`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(message: &str) -> io::Result<bool> {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            warn!("Cannot prompt for confirmation in non-interactive mode. Use --auto-approve to proceed.");
            return Ok(false);
        }

        write!(io::stderr(), "\n{} (yes/no): ", message)?;
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(is_yes(&input))
    }
}

impl ApprovalPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        Self::ask(message).unwrap_or_else(|e| {
            warn!("Failed to read confirmation: {}", e);
            false
        })
    }
}

fn is_yes(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}
