//! Pipeline driver and the standard stage chains.

use std::sync::Arc;

use forge_iac::Executor;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::approval::ApprovalPrompt;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::events::StageEvent;
use crate::stage::Stage;
use crate::stages::{
    ConventionBuild, ConventionScan, ConventionStubs, ConventionTerraformApply,
    ConventionTerraformDestroy, ConventionTerraformInit, ConventionTerraformOutputs,
    ConventionTerraformPlan,
};
use crate::state::ProjectState;

/// Callback invoked for every event as soon as a stage finishes.
pub type EventObserver = Arc<dyn Fn(&StageEvent) + Send + Sync>;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub state: ProjectState,
    pub events: Vec<StageEvent>,
}

/// The first failing stage, with every event emitted up to that point.
///
/// The message already includes `error`, so it is not reported as a source.
#[derive(Error, Debug)]
#[error("stage '{stage}' failed: {error}")]
pub struct PipelineFailure {
    pub stage: String,
    pub error: PipelineError,
    pub events: Vec<StageEvent>,
}

/// An ordered chain of stages.
///
/// # Example
///
/// ```rust,ignore
/// let output = Pipeline::new()
///     .stage(ConventionScan::new())
///     .stage(ConventionStubs::new())
///     .run(&PipelineContext::new(), ProjectState::new("."))
///     .await?;
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    observer: Option<EventObserver>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append every stage of another pipeline.
    pub fn chain(mut self, other: Pipeline) -> Self {
        self.stages.extend(other.stages);
        self
    }

    /// Receive events as each stage completes, e.g. to print them live.
    pub fn with_observer(mut self, observer: EventObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn observe(&self, events: &[StageEvent]) {
        if let Some(observer) = &self.observer {
            events.iter().for_each(|e| observer(e));
        }
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run(
        &self,
        ctx: &PipelineContext,
        initial: ProjectState,
    ) -> Result<PipelineOutput, PipelineFailure> {
        let total = self.stages.len();
        let mut state = initial;
        let mut events = Vec::new();

        info!("Starting pipeline run {} ({} stages)", ctx.run_id, total);

        for (i, stage) in self.stages.iter().enumerate() {
            if ctx.is_cancelled() {
                info!("Pipeline cancelled before stage {}", stage.name());
                return Err(PipelineFailure {
                    stage: stage.name().to_string(),
                    error: PipelineError::Cancelled,
                    events,
                });
            }

            info!("Running stage [{}/{}]: {}", i + 1, total, stage.name());

            match stage.run(ctx, state).await {
                Ok(outcome) => {
                    self.observe(&outcome.events);
                    events.extend(outcome.events);
                    state = outcome.state;
                    debug!("Stage {} reached phase {}", stage.name(), state.phase);
                }
                Err(failure) => {
                    error!("Stage {} failed: {}", stage.name(), failure.error);
                    self.observe(&failure.events);
                    events.extend(failure.events);
                    return Err(PipelineFailure {
                        stage: stage.name().to_string(),
                        error: failure.error,
                        events,
                    });
                }
            }
        }

        info!("Pipeline run {} completed", ctx.run_id);
        Ok(PipelineOutput { state, events })
    }
}

/// Knobs shared by the deploy and destroy chains.
#[derive(Clone, Default)]
pub struct DeployOptions {
    /// Resource name prefix; empty for the default deployment
    pub namespace: String,
    pub auto_approve: bool,
    /// Consulted when `auto_approve` is off
    pub prompt: Option<Arc<dyn ApprovalPrompt>>,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

/// Scan and write placeholder packages.
pub fn stub_pipeline() -> Pipeline {
    Pipeline::new()
        .stage(ConventionScan::new())
        .stage(ConventionStubs::new())
}

/// Scan, stub and build.
pub fn build_pipeline(build: ConventionBuild) -> Pipeline {
    stub_pipeline().stage(build)
}

/// Init, plan, apply, capture outputs.
pub fn infra_pipeline(executor: Arc<dyn Executor>, options: &DeployOptions) -> Pipeline {
    let mut apply = ConventionTerraformApply::new(executor.clone(), options.auto_approve);
    if let Some(prompt) = &options.prompt {
        apply = apply.with_prompt(prompt.clone());
    }

    Pipeline::new()
        .stage(ConventionTerraformInit::new(executor.clone()))
        .stage(ConventionTerraformPlan::new(
            executor.clone(),
            options.namespace.clone(),
        ))
        .stage(apply)
        .stage(ConventionTerraformOutputs::new(executor))
}

/// The full chain: scan, stub, build, init, plan, apply, capture outputs.
pub fn deploy_pipeline(
    build: ConventionBuild,
    executor: Arc<dyn Executor>,
    options: &DeployOptions,
) -> Pipeline {
    build_pipeline(build).chain(infra_pipeline(executor, options))
}

/// Init then destroy.
pub fn destroy_pipeline(executor: Arc<dyn Executor>, options: &DeployOptions) -> Pipeline {
    let mut destroy = ConventionTerraformDestroy::new(
        executor.clone(),
        options.namespace.clone(),
        options.auto_approve,
    );
    if let Some(prompt) = &options.prompt {
        destroy = destroy.with_prompt(prompt.clone());
    }

    Pipeline::new()
        .stage(ConventionTerraformInit::new(executor))
        .stage(destroy)
}
