//! Terraform executor running the local `terraform` binary.

use std::path::Path;

use async_trait::async_trait;
use forge_build::process::{self, CommandOutput, CommandSpec};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{IacError, IacResult};
use crate::executor::{Executor, InfraOperation, Outputs, Vars};

/// Saved plan file name, relative to the working directory.
pub const PLAN_FILE: &str = "tfplan";

/// `plan -detailed-exitcode` status for a plan with changes.
const EXIT_CHANGES_PRESENT: i32 = 2;

/// Executor backed by the Terraform CLI.
#[derive(Debug, Clone)]
pub struct TerraformExecutor {
    binary: String,
}

impl Default for TerraformExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformExecutor {
    /// Create an executor using `terraform` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: "terraform".to_string(),
        }
    }

    /// Use a specific terraform binary.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Check whether the binary can be executed.
    pub async fn is_available(&self, ctx: &CancellationToken) -> bool {
        let spec = CommandSpec::new(&self.binary).arg("version");
        matches!(process::run(ctx, &spec).await, Ok(output) if output.success())
    }

    async fn run(
        &self,
        ctx: &CancellationToken,
        dir: &Path,
        operation: InfraOperation,
        args: Vec<String>,
    ) -> IacResult<CommandOutput> {
        let spec = CommandSpec::new(&self.binary)
            .args(args)
            .env("TF_IN_AUTOMATION", "1")
            .current_dir(dir);
        debug!("terraform {}: {} in {:?}", operation, spec.display(), dir);
        Ok(process::run(ctx, &spec).await?)
    }

    fn check(operation: InfraOperation, output: &CommandOutput) -> IacResult<()> {
        if output.success() {
            Ok(())
        } else {
            Err(parse_terraform_error(
                operation.as_str(),
                output.exit_code.unwrap_or(-1),
                &output.stderr,
            ))
        }
    }
}

fn var_args(vars: &Vars) -> impl Iterator<Item = String> + '_ {
    vars.iter()
        .flat_map(|(key, value)| ["-var".to_string(), format!("{}={}", key, value)])
}

pub fn init_args() -> Vec<String> {
    ["init", "-input=false", "-no-color"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn plan_args(vars: &Vars) -> Vec<String> {
    let mut args: Vec<String> = ["plan", "-input=false", "-no-color", "-detailed-exitcode"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(format!("-out={}", PLAN_FILE));
    args.extend(var_args(vars));
    args
}

/// Apply arguments; a saved plan is applied when one exists.
pub fn apply_args(has_plan: bool) -> Vec<String> {
    let mut args: Vec<String> = ["apply", "-input=false", "-no-color", "-auto-approve"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if has_plan {
        args.push(PLAN_FILE.to_string());
    }
    args
}

pub fn destroy_args(vars: &Vars) -> Vec<String> {
    let mut args: Vec<String> = ["destroy", "-auto-approve", "-input=false", "-no-color"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(var_args(vars));
    args
}

/// Interpret the exit code of `plan -detailed-exitcode`.
///
/// Returns `Some(has_changes)` for the two success codes, `None` otherwise.
pub fn interpret_plan_exit(exit_code: Option<i32>) -> Option<bool> {
    match exit_code {
        Some(0) => Some(false),
        Some(EXIT_CHANGES_PRESENT) => Some(true),
        _ => None,
    }
}

/// Decode `terraform output -json` into name to value.
pub fn decode_outputs(stdout: &str) -> IacResult<Outputs> {
    if stdout.trim().is_empty() {
        return Ok(Outputs::new());
    }

    let raw: serde_json::Map<String, Value> = serde_json::from_str(stdout)?;
    Ok(raw
        .into_iter()
        .map(|(name, mut entry)| {
            let value = entry
                .get_mut("value")
                .map(Value::take)
                .unwrap_or(entry);
            (name, value)
        })
        .collect())
}

/// Classify a failed terraform invocation from its stderr.
pub fn parse_terraform_error(command: &str, exit_code: i32, stderr: &str) -> IacError {
    if stderr.contains("Error locking state") || stderr.contains("Error acquiring the state lock") {
        return IacError::StateLocked {
            lock_id: extract_lock_id(stderr),
            message: stderr.to_string(),
        };
    }

    if stderr.contains("Error: Invalid") || stderr.contains("Error: Unsupported") {
        return IacError::ValidationFailed(stderr.to_string());
    }

    IacError::CommandFailed {
        command: command.to_string(),
        exit_code,
        stderr: stderr.to_string(),
    }
}

fn extract_lock_id(stderr: &str) -> String {
    stderr
        .find("ID: ")
        .map(|index| {
            let rest = &stderr[index + 4..];
            rest.lines().next().unwrap_or_default().trim().to_string()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Executor for TerraformExecutor {
    async fn init(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()> {
        info!("Running terraform init in {:?}", dir);
        let output = self.run(ctx, dir, InfraOperation::Init, init_args()).await?;
        Self::check(InfraOperation::Init, &output)
    }

    async fn plan_with_vars(
        &self,
        ctx: &CancellationToken,
        dir: &Path,
        vars: &Vars,
    ) -> IacResult<bool> {
        info!("Running terraform plan in {:?}", dir);
        let output = self.run(ctx, dir, InfraOperation::Plan, plan_args(vars)).await?;
        interpret_plan_exit(output.exit_code).ok_or_else(|| {
            parse_terraform_error(
                InfraOperation::Plan.as_str(),
                output.exit_code.unwrap_or(-1),
                &output.stderr,
            )
        })
    }

    async fn apply(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()> {
        info!("Running terraform apply in {:?}", dir);
        let has_plan = dir.join(PLAN_FILE).is_file();
        let output = self
            .run(ctx, dir, InfraOperation::Apply, apply_args(has_plan))
            .await?;
        Self::check(InfraOperation::Apply, &output)
    }

    async fn destroy_with_vars(
        &self,
        ctx: &CancellationToken,
        dir: &Path,
        vars: &Vars,
    ) -> IacResult<()> {
        info!("Running terraform destroy in {:?}", dir);
        let output = self
            .run(ctx, dir, InfraOperation::Destroy, destroy_args(vars))
            .await?;
        Self::check(InfraOperation::Destroy, &output)
    }

    async fn output(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<Outputs> {
        let args = vec!["output".to_string(), "-json".to_string()];
        let output = self.run(ctx, dir, InfraOperation::Output, args).await?;
        Self::check(InfraOperation::Output, &output)?;
        decode_outputs(&output.stdout)
    }
}
