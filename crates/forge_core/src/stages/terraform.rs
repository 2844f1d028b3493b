//! Infrastructure stages run against `<root>/infra`.

use std::sync::Arc;

use async_trait::async_trait;
use forge_iac::{Executor, InfraOperation, Outputs, Vars};
use tracing::{info, warn};

use crate::approval::{self, ApprovalPrompt};
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::events::StageEvent;
use crate::stage::{Stage, StageError, StageOutcome, StageResult};
use crate::state::{Phase, ProjectState};

/// Terraform variables for a deployment namespace.
///
/// A non-empty namespace is passed as `namespace = "<ns>-"` so it can be used
/// directly as a resource name prefix.
pub fn namespace_vars(namespace: &str) -> Vars {
    let mut vars = Vars::new();
    if !namespace.is_empty() {
        vars.insert("namespace".to_string(), format!("{}-", namespace));
    }
    vars
}

fn fail(operation: InfraOperation, source: forge_iac::IacError, events: Vec<StageEvent>) -> StageError {
    StageError::new(PipelineError::executor(operation, source), events)
}

/// Ask for confirmation unless auto-approved. No prompt means no approval.
async fn approve(
    ctx: &PipelineContext,
    auto_approve: bool,
    prompt: Option<&Arc<dyn ApprovalPrompt>>,
    message: &str,
) -> Result<bool, PipelineError> {
    if auto_approve {
        return Ok(true);
    }
    match prompt {
        Some(prompt) => approval::ask(ctx, prompt.clone(), message).await,
        None => Ok(false),
    }
}

/// Runs `terraform init`.
#[derive(Clone)]
pub struct ConventionTerraformInit {
    executor: Arc<dyn Executor>,
}

impl ConventionTerraformInit {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Stage for ConventionTerraformInit {
    fn name(&self) -> &str {
        "terraform-init"
    }

    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult {
        let mut events = vec![StageEvent::info("==> Initializing Terraform...")];

        if let Err(e) = self.executor.init(&ctx.cancel, &state.infra_dir()).await {
            return Err(fail(InfraOperation::Init, e, events));
        }

        events.push(StageEvent::success("[terraform] Initialized"));
        let phase = state.phase.max(Phase::Initialized);
        Ok(StageOutcome::new(state.advance(phase), events))
    }
}

/// Computes a plan, optionally scoped to a namespace.
#[derive(Clone)]
pub struct ConventionTerraformPlan {
    executor: Arc<dyn Executor>,
    namespace: String,
}

impl ConventionTerraformPlan {
    pub fn new(executor: Arc<dyn Executor>, namespace: impl Into<String>) -> Self {
        Self {
            executor,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl Stage for ConventionTerraformPlan {
    fn name(&self) -> &str {
        "terraform-plan"
    }

    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult {
        state.require(Phase::Initialized)?;

        let mut events = vec![StageEvent::info("==> Planning infrastructure changes...")];
        let dir = state.infra_dir();

        let planned = if self.namespace.is_empty() {
            self.executor.plan(&ctx.cancel, &dir).await
        } else {
            events.push(StageEvent::info(format!(
                "Deploying to namespace: {}",
                self.namespace
            )));
            self.executor
                .plan_with_vars(&ctx.cancel, &dir, &namespace_vars(&self.namespace))
                .await
        };

        let has_changes = match planned {
            Ok(has_changes) => has_changes,
            Err(e) => return Err(fail(InfraOperation::Plan, e, events)),
        };

        let message = if has_changes {
            "[terraform] Changes detected"
        } else {
            "[terraform] No changes detected"
        };
        events.push(StageEvent::info(message).with_data("has_changes", has_changes));

        Ok(StageOutcome::new(state.advance(Phase::Planned), events))
    }
}

/// Applies the saved plan after confirmation.
#[derive(Clone)]
pub struct ConventionTerraformApply {
    executor: Arc<dyn Executor>,
    auto_approve: bool,
    prompt: Option<Arc<dyn ApprovalPrompt>>,
}

impl ConventionTerraformApply {
    pub fn new(executor: Arc<dyn Executor>, auto_approve: bool) -> Self {
        Self {
            executor,
            auto_approve,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

#[async_trait]
impl Stage for ConventionTerraformApply {
    fn name(&self) -> &str {
        "terraform-apply"
    }

    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult {
        state.require(Phase::Planned)?;

        let approved = approve(
            ctx,
            self.auto_approve,
            self.prompt.as_ref(),
            "Do you want to apply these changes?",
        )
        .await?;
        if !approved {
            warn!("Apply not approved");
            let events = vec![StageEvent::warning("deployment canceled by user")];
            let error = PipelineError::ApprovalDenied {
                operation: InfraOperation::Apply,
            };
            return Err(StageError::new(error, events));
        }

        let mut events = vec![StageEvent::info("==> Applying infrastructure changes...")];

        if let Err(e) = self.executor.apply(&ctx.cancel, &state.infra_dir()).await {
            return Err(fail(InfraOperation::Apply, e, events));
        }

        events.push(StageEvent::success("[terraform] Applied successfully"));
        Ok(StageOutcome::new(state.advance(Phase::Applied), events))
    }
}

/// Captures root module outputs. Failure here never halts the pipeline.
#[derive(Clone)]
pub struct ConventionTerraformOutputs {
    executor: Arc<dyn Executor>,
}

impl ConventionTerraformOutputs {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Stage for ConventionTerraformOutputs {
    fn name(&self) -> &str {
        "terraform-outputs"
    }

    async fn run(&self, ctx: &PipelineContext, mut state: ProjectState) -> StageResult {
        let mut events = Vec::new();

        match self.executor.output(&ctx.cancel, &state.infra_dir()).await {
            Ok(outputs) => {
                if !outputs.is_empty() {
                    events.push(
                        StageEvent::info(format!("Captured {} output(s)", outputs.len()))
                            .with_data("count", outputs.len()),
                    );
                }
                state.outputs = Some(outputs);
            }
            Err(e) => {
                warn!("Failed to retrieve outputs: {}", e);
                events.push(StageEvent::warning(format!(
                    "Failed to retrieve outputs: {}",
                    e
                )));
                state.outputs.get_or_insert_with(Outputs::new);
            }
        }

        Ok(StageOutcome::new(state.advance(Phase::OutputsCaptured), events))
    }
}

/// Tears down everything under `<root>/infra` after confirmation.
#[derive(Clone)]
pub struct ConventionTerraformDestroy {
    executor: Arc<dyn Executor>,
    namespace: String,
    auto_approve: bool,
    prompt: Option<Arc<dyn ApprovalPrompt>>,
}

impl ConventionTerraformDestroy {
    pub fn new(
        executor: Arc<dyn Executor>,
        namespace: impl Into<String>,
        auto_approve: bool,
    ) -> Self {
        Self {
            executor,
            namespace: namespace.into(),
            auto_approve,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

#[async_trait]
impl Stage for ConventionTerraformDestroy {
    fn name(&self) -> &str {
        "terraform-destroy"
    }

    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult {
        state.require(Phase::Initialized)?;

        let target = if self.namespace.is_empty() {
            "all infrastructure".to_string()
        } else {
            format!("namespace '{}'", self.namespace)
        };
        let approved = approve(
            ctx,
            self.auto_approve,
            self.prompt.as_ref(),
            &format!("Do you want to destroy {}?", target),
        )
        .await?;
        if !approved {
            let events = vec![StageEvent::warning("destroy canceled by user")];
            let error = PipelineError::ApprovalDenied {
                operation: InfraOperation::Destroy,
            };
            return Err(StageError::new(error, events));
        }

        let mut events = vec![StageEvent::info(format!("==> Destroying {}...", target))];

        let vars = namespace_vars(&self.namespace);
        if let Err(e) = self
            .executor
            .destroy_with_vars(&ctx.cancel, &state.infra_dir(), &vars)
            .await
        {
            return Err(fail(InfraOperation::Destroy, e, events));
        }

        info!("Destroyed {}", target);
        events.push(StageEvent::success("[terraform] Destroyed"));

        let mut state = state;
        state.outputs = None;
        Ok(StageOutcome::new(state.advance(Phase::Destroyed), events))
    }
}
