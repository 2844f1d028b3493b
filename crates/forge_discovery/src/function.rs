//! Discovered function descriptors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP trigger for a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRoute {
    pub method: String,
    pub path: String,
}

/// A deployable function found under the functions directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name (directory name)
    pub name: String,
    /// Absolute path to the function source
    pub path: PathBuf,
    /// Detected runtime identifier
    pub runtime: String,
    /// Entry file that identified the runtime (`main.go`, `index.js`, ...)
    pub entry_point: String,
    /// Timeout override in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Memory override in MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRoute>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        runtime: impl Into<String>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            runtime: runtime.into(),
            entry_point: entry_point.into(),
            timeout: None,
            memory: None,
            http: None,
        }
    }

    /// Timeout in seconds, falling back to the project default.
    pub fn timeout_or(&self, defaults: &FunctionDefaults) -> u32 {
        self.timeout.unwrap_or(defaults.timeout)
    }

    /// Memory in MB, falling back to the project default.
    pub fn memory_or(&self, defaults: &FunctionDefaults) -> u32 {
        self.memory.unwrap_or(defaults.memory)
    }
}

/// Project-wide settings applied to functions without overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDefaults {
    /// Seconds
    pub timeout: u32,
    /// MB
    pub memory: u32,
}

impl Default for FunctionDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            memory: 256,
        }
    }
}
