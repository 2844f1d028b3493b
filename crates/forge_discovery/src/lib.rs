//! # forge_discovery
//!
//! Convention-based function discovery for forge.
//!
//! A project keeps one directory per function under `src/functions`. The
//! runtime of each function is inferred from its entry file:
//!
//! | entry file                                   | runtime           |
//! |----------------------------------------------|-------------------|
//! | `main.go`, `*.go`                            | `provided.al2023` |
//! | `index.js`, `index.mjs`, `handler.js`        | `nodejs20.x`      |
//! | `app.py`, `lambda_function.py`, `handler.py` | `python3.13`      |
//! | `pom.xml`                                    | `java21`          |
//!
//! An optional `function.forge.json` next to the entry file overrides the
//! timeout, memory and HTTP route.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use forge_discovery::{build_dir, create_stub_zips, scan_functions, to_build_config};
//!
//! let root = Path::new("./my-app");
//! let functions = scan_functions(root).unwrap();
//! create_stub_zips(&functions, &build_dir(root)).unwrap();
//!
//! for function in &functions {
//!     let config = to_build_config(function, &build_dir(root)).unwrap();
//!     println!("{} -> {:?}", function.name, config.output_path);
//! }
//! ```

pub mod convert;
pub mod error;
pub mod function;
pub mod metadata;
pub mod scanner;
pub mod stub;

pub use convert::{artifact_path, build_dir, to_build_config};
pub use error::{DiscoveryError, DiscoveryResult};
pub use function::{Function, FunctionDefaults, HttpRoute};
pub use metadata::FunctionMetadata;
pub use scanner::{detect_runtime, scan_functions, scan_functions_with, ScanOptions};
pub use stub::{create_stub_zip, create_stub_zips};
