//! Convention-driven discovery and build stages.

use std::path::PathBuf;

use async_trait::async_trait;
use forge_build::{build_all_partial, BuildConfig, BuilderRegistry, Decorator};
use forge_discovery::{create_stub_zips, scan_functions_with, to_build_config, ScanOptions};
use tracing::{debug, info};

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::events::StageEvent;
use crate::stage::{Stage, StageError, StageOutcome, StageResult};
use crate::state::{Phase, ProjectState};

/// Discovers functions under the project's functions directory.
#[derive(Debug, Clone, Default)]
pub struct ConventionScan {
    options: ScanOptions,
}

impl ConventionScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Stage for ConventionScan {
    fn name(&self) -> &str {
        "scan"
    }

    async fn run(&self, _ctx: &PipelineContext, state: ProjectState) -> StageResult {
        let mut events = vec![StageEvent::info("==> Scanning for Lambda functions...")];

        let functions = match scan_functions_with(state.root(), &self.options) {
            Ok(functions) => functions,
            Err(e) => return Err(StageError::new(e.into(), events)),
        };

        events.push(
            StageEvent::success(format!("Found {} function(s)", functions.len()))
                .with_data("count", functions.len()),
        );
        events.extend(
            functions
                .iter()
                .map(|f| StageEvent::info(format!("  - {} ({})", f.name, f.runtime))),
        );

        let mut state = state.advance(Phase::Scanned);
        state.functions = functions;
        Ok(StageOutcome::new(state, events))
    }
}

/// Writes placeholder packages for functions that have not been built yet,
/// so infrastructure code referencing them can be planned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionStubs;

impl ConventionStubs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for ConventionStubs {
    fn name(&self) -> &str {
        "stubs"
    }

    async fn run(&self, _ctx: &PipelineContext, state: ProjectState) -> StageResult {
        state.require(Phase::Scanned)?;

        let count = create_stub_zips(&state.functions, &state.build_dir())
            .map_err(PipelineError::Stubs)?;

        let mut events = Vec::new();
        if count > 0 {
            events.push(StageEvent::info(format!("Created {} stub zip(s)", count)));
        }
        debug!("Stub packages ready ({} created)", count);

        // Building requires a scan, not stubs, so never move a built state backwards.
        let phase = state.phase.max(Phase::StubsReady);
        Ok(StageOutcome::new(state.advance(phase), events))
    }
}

/// Builds every discovered function with the registry's builders.
#[derive(Clone)]
pub struct ConventionBuild {
    registry: BuilderRegistry,
    decorator: Option<Decorator>,
    concurrency: usize,
    build_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ConventionBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConventionBuild")
            .field("registry", &self.registry)
            .field("decorated", &self.decorator.is_some())
            .field("concurrency", &self.concurrency)
            .field("build_dir", &self.build_dir)
            .finish()
    }
}

impl ConventionBuild {
    pub fn new(registry: BuilderRegistry) -> Self {
        Self {
            registry,
            decorator: None,
            concurrency: 1,
            build_dir: None,
        }
    }

    /// Wrap every builder, e.g. with caching and logging.
    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Write packages somewhere other than `<root>/.forge/build`.
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }

    fn registry(&self) -> BuilderRegistry {
        match &self.decorator {
            Some(decorator) => self.registry.decorate(decorator),
            None => self.registry.clone(),
        }
    }
}

#[async_trait]
impl Stage for ConventionBuild {
    fn name(&self) -> &str {
        "build"
    }

    async fn run(&self, ctx: &PipelineContext, state: ProjectState) -> StageResult {
        state.require(Phase::Scanned)?;

        let build_dir = self
            .build_dir
            .clone()
            .unwrap_or_else(|| state.build_dir());
        let configs = state
            .functions
            .iter()
            .map(|f| to_build_config(f, &build_dir))
            .collect::<Result<Vec<BuildConfig>, _>>()?;

        let mut events = vec![StageEvent::info("==> Building Lambda functions...")];
        let registry = self.registry();
        let mut started = Vec::with_capacity(configs.len());

        let outcome = build_all_partial(
            &ctx.cancel,
            &configs,
            &registry,
            self.concurrency,
            |index, _total| started.push(index),
        )
        .await;

        let total = configs.len();
        for index in started {
            let function = &state.functions[index];
            events.push(StageEvent::info(format!(
                "[{}/{}] {}",
                index + 1,
                total,
                function.name
            )));
            if let Some(artifact) = outcome.artifacts.get(index) {
                events.push(
                    StageEvent::success(format!(
                        "[{}] Built: {} ({:.2} MB)",
                        function.name,
                        artifact.file_name(),
                        artifact.size_mb()
                    ))
                    .with_data("function", function.name.as_str())
                    .with_data("size", artifact.size),
                );
            }
        }

        if let Some(failed) = outcome.failure {
            let function = &state.functions[failed.index];
            events.push(StageEvent::error(format!(
                "[{}] Build failed: {}",
                function.name, failed.error
            )));
            let error = PipelineError::build(function.name.clone(), failed.error);
            return Err(StageError::new(error, events));
        }

        info!("Built {} function(s)", outcome.artifacts.len());

        let mut state = state;
        let artifacts = state
            .functions
            .iter()
            .map(|f| f.name.clone())
            .zip(outcome.artifacts)
            .collect();
        state.artifacts = artifacts;
        Ok(StageOutcome::new(state.advance(Phase::Built), events))
    }
}
