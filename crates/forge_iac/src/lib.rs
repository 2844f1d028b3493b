//! # forge_iac
//!
//! Infrastructure tool execution for forge.
//!
//! Pipeline stages talk to the infrastructure tool only through the
//! [`Executor`] trait. [`TerraformExecutor`] runs the local `terraform`
//! binary; [`MockExecutor`] records calls for tests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use forge_iac::{Executor, TerraformExecutor, Vars};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> forge_iac::IacResult<()> {
//! let executor = TerraformExecutor::new();
//! let ctx = CancellationToken::new();
//! let infra = Path::new("./my-app/infra");
//!
//! executor.init(&ctx, infra).await?;
//! let mut vars = Vars::new();
//! vars.insert("namespace".to_string(), "pr-42-".to_string());
//! if executor.plan_with_vars(&ctx, infra, &vars).await? {
//!     executor.apply(&ctx, infra).await?;
//! }
//! let outputs = executor.output(&ctx, infra).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod mock;
pub mod terraform;

pub use error::{IacError, IacResult};
pub use executor::{Executor, InfraOperation, Outputs, Vars};
pub use mock::{ExecutorCall, MockExecutor};
pub use terraform::{parse_terraform_error, TerraformExecutor, PLAN_FILE};
