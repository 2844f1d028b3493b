//! Placeholder deployment packages.
//!
//! Infrastructure code references `<build_dir>/<name>.zip` for every function.
//! Stubs let the infrastructure tool initialize and plan before real builds
//! exist.

use std::fs;
use std::path::Path;

use forge_build::package::write_stub_zip;
use tracing::debug;

use crate::convert::artifact_path;
use crate::error::DiscoveryResult;
use crate::function::Function;

/// Write an empty placeholder package, creating parent directories.
pub fn create_stub_zip(path: &Path) -> DiscoveryResult<()> {
    write_stub_zip(path)?;
    Ok(())
}

/// Create a stub for every function whose package is missing.
///
/// Existing packages, real or stub, are left untouched. Returns the number of
/// stubs created.
pub fn create_stub_zips(functions: &[Function], build_dir: &Path) -> DiscoveryResult<usize> {
    fs::create_dir_all(build_dir)?;

    let mut created = 0;
    for function in functions {
        let path = artifact_path(build_dir, &function.name);
        if path.exists() {
            continue;
        }
        create_stub_zip(&path)?;
        debug!("Created stub for {}", function.name);
        created += 1;
    }
    Ok(created)
}
