//! # forge_core
//!
//! Deployment pipeline engine for forge.
//!
//! A pipeline is an ordered chain of [`Stage`]s. Each stage consumes the
//! [`ProjectState`], returns the next one together with the [`StageEvent`]s it
//! emitted, or fails and halts the chain.
//!
//! # Architecture
//!
//! - **State**: typed project state with an ordered [`Phase`] tag
//! - **Stages**: discovery, stubs, build, and the infrastructure steps
//! - **Pipeline**: folds stages left to right, keeping every event
//! - **Config**: optional `forge.toml` in the project root
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use forge_build::BuilderRegistry;
//! use forge_core::{deploy_pipeline, ConventionBuild, DeployOptions, PipelineContext, ProjectState};
//! use forge_iac::TerraformExecutor;
//!
//! let pipeline = deploy_pipeline(
//!     ConventionBuild::new(BuilderRegistry::with_defaults()),
//!     Arc::new(TerraformExecutor::new()),
//!     &DeployOptions::new().with_namespace("pr-42").with_auto_approve(true),
//! );
//! let output = pipeline.run(&PipelineContext::new(), ProjectState::new(".")).await?;
//! println!("{:?}", output.state.outputs);
//! ```

pub mod approval;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod record;
pub mod stage;
pub mod stages;
pub mod state;

pub use approval::{ApprovalPrompt, DenyAll};
pub use config::{BuildSettings, ForgeConfig, ProjectConfig, CONFIG_FILE, REGION_ENV};
pub use context::PipelineContext;
pub use error::{PipelineError, PipelineResult};
pub use events::{render_events, EventLevel, StageEvent};
pub use pipeline::{
    build_pipeline, deploy_pipeline, destroy_pipeline, infra_pipeline, stub_pipeline,
    DeployOptions, EventObserver, Pipeline, PipelineFailure, PipelineOutput,
};
pub use record::{RunRecord, RunStatus};
pub use stage::{Stage, StageError, StageOutcome, StageResult};
pub use stages::{
    namespace_vars, ConventionBuild, ConventionScan, ConventionStubs, ConventionTerraformApply,
    ConventionTerraformDestroy, ConventionTerraformInit, ConventionTerraformOutputs,
    ConventionTerraformPlan,
};
pub use state::{Phase, ProjectState, INFRA_DIR};
