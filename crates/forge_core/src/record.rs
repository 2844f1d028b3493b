//! Persistent record of a pipeline run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::events::StageEvent;
use crate::pipeline::{PipelineFailure, PipelineOutput};

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
    Cancelled,
}

/// What happened during one invocation, written to `.forge/runs/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    /// Command that started the run (build, deploy, destroy)
    pub command: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Stage that failed, if any
    pub failed_stage: Option<String>,
    pub error: Option<String>,
    pub events: Vec<StageEvent>,
}

impl RunRecord {
    pub fn succeeded(
        run_id: Uuid,
        command: impl Into<String>,
        started_at: DateTime<Utc>,
        output: &PipelineOutput,
    ) -> Self {
        Self {
            run_id,
            command: command.into(),
            status: RunStatus::Succeeded,
            started_at,
            completed_at: Utc::now(),
            failed_stage: None,
            error: None,
            events: output.events.clone(),
        }
    }

    pub fn failed(
        run_id: Uuid,
        command: impl Into<String>,
        started_at: DateTime<Utc>,
        failure: &PipelineFailure,
    ) -> Self {
        let status = match failure.error {
            PipelineError::Cancelled => RunStatus::Cancelled,
            _ => RunStatus::Failed,
        };
        Self {
            run_id,
            command: command.into(),
            status,
            started_at,
            completed_at: Utc::now(),
            failed_stage: Some(failure.stage.clone()),
            error: Some(failure.error.to_string()),
            events: failure.events.clone(),
        }
    }

    /// Directory holding run records for a project.
    pub fn runs_dir(root: &Path) -> PathBuf {
        root.join(".forge").join("runs")
    }

    pub fn path(&self, root: &Path) -> PathBuf {
        Self::runs_dir(root).join(format!("{}.json", self.run_id))
    }

    /// Write the record under the project root.
    pub fn save(&self, root: &Path) -> PipelineResult<PathBuf> {
        let path = self.path(root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("cannot serialize run record: {}", e)))?;
        fs::write(&path, json)?;
        debug!("Saved run record to {:?}", path);
        Ok(path)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("invalid run record {:?}: {}", path, e)))
    }
}
