//! The infrastructure executor interface.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::IacResult;

/// Input variables passed to the infrastructure tool.
pub type Vars = BTreeMap<String, String>;

/// Captured infrastructure outputs, name to value.
pub type Outputs = BTreeMap<String, serde_json::Value>;

/// Operations an [`Executor`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraOperation {
    Init,
    Plan,
    Apply,
    Destroy,
    Output,
}

impl InfraOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfraOperation::Init => "init",
            InfraOperation::Plan => "plan",
            InfraOperation::Apply => "apply",
            InfraOperation::Destroy => "destroy",
            InfraOperation::Output => "output",
        }
    }
}

impl fmt::Display for InfraOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives an infrastructure tool against a working directory.
///
/// Every operation is long running and may be cancelled through `ctx`.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Prepare the working directory (providers, backend, modules).
    async fn init(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()>;

    /// Compute a plan. Returns whether the plan contains changes.
    async fn plan(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<bool> {
        self.plan_with_vars(ctx, dir, &Vars::new()).await
    }

    /// Compute a plan with input variables.
    async fn plan_with_vars(&self, ctx: &CancellationToken, dir: &Path, vars: &Vars)
        -> IacResult<bool>;

    /// Apply the most recent plan.
    async fn apply(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()>;

    /// Tear down everything the working directory manages.
    async fn destroy(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<()> {
        self.destroy_with_vars(ctx, dir, &Vars::new()).await
    }

    async fn destroy_with_vars(&self, ctx: &CancellationToken, dir: &Path, vars: &Vars)
        -> IacResult<()>;

    /// Read the root module outputs.
    async fn output(&self, ctx: &CancellationToken, dir: &Path) -> IacResult<Outputs>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(InfraOperation::Init.to_string(), "init");
        assert_eq!(InfraOperation::Output.as_str(), "output");
        assert_eq!(
            serde_json::to_string(&InfraOperation::Destroy).unwrap(),
            "\"destroy\""
        );
    }
}
