//! Built-in runtime builders.

mod go;
mod java;
mod node;
mod python;

pub use go::GoBuilder;
pub use java::JavaBuilder;
pub use node::NodeBuilder;
pub use python::PythonBuilder;

use std::path::Path;

use crate::error::{BuildError, BuildResult};

/// Fail early when the source directory is missing.
fn require_source_dir(dir: &Path) -> BuildResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(BuildError::InvalidConfig(format!(
            "source directory does not exist: {}",
            dir.display()
        )))
    }
}
