//! External process execution with cooperative cancellation.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult};

/// Description of a command to run.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub workdir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Render the command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    fn status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Run a process to completion, capturing its output.
///
/// The child inherits the current environment plus `spec.env`. If `ctx` is
/// cancelled first, the child is killed and `BuildError::Cancelled` returned.
pub async fn run(ctx: &CancellationToken, spec: &CommandSpec) -> BuildResult<CommandOutput> {
    if ctx.is_cancelled() {
        return Err(BuildError::Cancelled);
    }

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.workdir {
        command.current_dir(dir);
    }

    debug!("Executing: {}", spec.display());
    let started = Instant::now();

    let child = command.spawn().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            BuildError::ToolNotFound(spec.program.clone())
        } else {
            BuildError::Io(e)
        }
    })?;

    let output = tokio::select! {
        output = child.wait_with_output() => output?,
        _ = ctx.cancelled() => {
            warn!("Cancelled: {}", spec.display());
            return Err(BuildError::Cancelled);
        }
    };

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Run a process and fail with `BuildError::CommandFailed` on a non-zero exit.
pub async fn run_checked(ctx: &CancellationToken, spec: &CommandSpec) -> BuildResult<CommandOutput> {
    let output = run(ctx, spec).await?;
    if !output.success() {
        return Err(BuildError::CommandFailed {
            program: spec.display(),
            status: output.status(),
            output: output.combined_output(),
        });
    }
    Ok(output)
}
