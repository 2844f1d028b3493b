//! Project state threaded through the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use forge_build::Artifact;
use forge_discovery::Function;
use forge_iac::Outputs;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Infrastructure code directory, relative to the project root.
pub const INFRA_DIR: &str = "infra";

/// How far a project has progressed through the pipeline.
///
/// Phases are ordered; a stage that needs an earlier stage's output checks
/// that the state has reached at least that phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Scanning,
    Scanned,
    StubsReady,
    Built,
    Initialized,
    Planned,
    Applied,
    OutputsCaptured,
    Destroyed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scanning => "scanning",
            Phase::Scanned => "scanned",
            Phase::StubsReady => "stubs_ready",
            Phase::Built => "built",
            Phase::Initialized => "initialized",
            Phase::Planned => "planned",
            Phase::Applied => "applied",
            Phase::OutputsCaptured => "outputs_captured",
            Phase::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State handed from stage to stage.
///
/// Each stage takes the state by value and returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    pub project_root: PathBuf,
    pub phase: Phase,
    /// Functions discovered by the scan stage
    pub functions: Vec<Function>,
    /// Built packages keyed by function name
    pub artifacts: BTreeMap<String, Artifact>,
    /// Infrastructure outputs, once captured
    pub outputs: Option<Outputs>,
}

impl ProjectState {
    /// Initial state: only the project root is known.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            phase: Phase::Scanning,
            functions: Vec::new(),
            artifacts: BTreeMap::new(),
            outputs: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }

    pub fn infra_dir(&self) -> PathBuf {
        self.project_root.join(INFRA_DIR)
    }

    pub fn build_dir(&self) -> PathBuf {
        forge_discovery::build_dir(&self.project_root)
    }

    /// Move to the given phase.
    pub fn advance(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Fail unless the state has reached `phase`.
    pub fn require(&self, phase: Phase) -> PipelineResult<()> {
        if self.phase >= phase {
            Ok(())
        } else {
            Err(PipelineError::InvalidState {
                expected: phase,
                found: self.phase,
            })
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
