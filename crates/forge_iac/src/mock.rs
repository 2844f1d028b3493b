//! Mock executor for testing.
//!
//! Provides a configurable implementation of the [`Executor`] trait that
//! records every call instead of running an infrastructure tool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::{IacError, IacResult};
use crate::executor::{Executor, InfraOperation, Outputs, Vars};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorCall {
    pub operation: InfraOperation,
    pub dir: PathBuf,
    pub vars: Vars,
}

/// Mock executor for testing.
///
/// Clones share state, so a test can keep a handle while a stage owns
/// another.
#[derive(Clone)]
pub struct MockExecutor {
    /// Value returned from plan calls.
    has_changes: Arc<RwLock<bool>>,
    /// Outputs returned from output calls.
    outputs: Arc<RwLock<Outputs>>,
    /// Operations that fail with the given message.
    failures: Arc<RwLock<HashMap<InfraOperation, String>>>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<ExecutorCall>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// Create a mock whose plans report changes and whose outputs are empty.
    pub fn new() -> Self {
        Self {
            has_changes: Arc::new(RwLock::new(true)),
            outputs: Arc::new(RwLock::new(Outputs::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the plan result.
    pub fn with_changes(self, has_changes: bool) -> Self {
        *self.has_changes.write() = has_changes;
        self
    }

    /// Set the outputs returned by `output`.
    pub fn with_outputs(self, outputs: Outputs) -> Self {
        *self.outputs.write() = outputs;
        self
    }

    /// Add a single output value.
    pub fn with_output(self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.outputs.write().insert(name.into(), value);
        self
    }

    /// Make an operation fail.
    pub fn fail_on(self, operation: InfraOperation, message: impl Into<String>) -> Self {
        self.failures.write().insert(operation, message.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<ExecutorCall> {
        self.captured_calls.read().clone()
    }

    /// Operations called, in order.
    pub fn operations(&self) -> Vec<InfraOperation> {
        self.captured_calls
            .read()
            .iter()
            .map(|c| c.operation)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    pub fn was_called(&self, operation: InfraOperation) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.operation == operation)
    }

    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    fn record(
        &self,
        ctx: &CancellationToken,
        operation: InfraOperation,
        dir: &Path,
        vars: &Vars,
    ) -> IacResult<()> {
        if ctx.is_cancelled() {
            return Err(IacError::Cancelled);
        }
        self.captured_calls.write().push(ExecutorCall {
            operation,
            dir: dir.to_path_buf(),
            vars: vars.clone(),
        });
        match self.failures.read().get(&operation) {
            Some(message) => Err(IacError::ExecutionFailed(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn init(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()> {
        self.record(ctx, InfraOperation::Init, dir, &Vars::new())
    }

    async fn plan_with_vars(
        &self,
        ctx: &CancellationToken,
        dir: &Path,
        vars: &Vars,
    ) -> IacResult<bool> {
        self.record(ctx, InfraOperation::Plan, dir, vars)?;
        Ok(*self.has_changes.read())
    }

    async fn apply(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()> {
        self.record(ctx, InfraOperation::Apply, dir, &Vars::new())
    }

    async fn destroy_with_vars(
        &self,
        ctx: &CancellationToken,
        dir: &Path,
        vars: &Vars,
    ) -> IacResult<()> {
        self.record(ctx, InfraOperation::Destroy, dir, vars)
    }

    async fn output(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<Outputs> {
        self.record(ctx, InfraOperation::Output, dir, &Vars::new())?;
        Ok(self.outputs.read().clone())
    }
}
