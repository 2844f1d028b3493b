//! Per-function metadata descriptor.
//!
//! ```json
//! { "timeout": 60, "memory": 512, "http": { "method": "GET", "path": "/users" } }
//! ```
//!
//! Every field is optional. A zero or negative number keeps the default, and
//! an HTTP route is only set when both method and path are present.

use std::fs;

use serde::Deserialize;
use tracing::debug;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::function::{Function, HttpRoute};

#[derive(Debug, Default, Deserialize)]
pub struct FunctionMetadata {
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub memory: Option<i64>,
    #[serde(default)]
    pub http: Option<HttpMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpMetadata {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

impl FunctionMetadata {
    pub fn parse(function: &str, content: &str) -> DiscoveryResult<Self> {
        serde_json::from_str(content).map_err(|source| DiscoveryError::MetadataParse {
            function: function.to_string(),
            source,
        })
    }

    /// Overlay the set fields onto a descriptor.
    pub fn apply(&self, function: &mut Function) {
        if let Some(timeout) = positive(self.timeout) {
            function.timeout = Some(timeout);
        }
        if let Some(memory) = positive(self.memory) {
            function.memory = Some(memory);
        }
        if let Some(http) = &self.http {
            let method = http.method.as_deref().unwrap_or_default();
            let path = http.path.as_deref().unwrap_or_default();
            if !method.is_empty() && !path.is_empty() {
                function.http = Some(HttpRoute {
                    method: method.to_string(),
                    path: path.to_string(),
                });
            }
        }
    }
}

/// Read and apply the metadata file in the function directory, if present.
pub fn load_metadata(function: &mut Function, file_name: &str) -> DiscoveryResult<()> {
    let path = function.path.join(file_name);
    if !path.is_file() {
        return Ok(());
    }

    let content = fs::read_to_string(&path)?;
    let metadata = FunctionMetadata::parse(&function.name, &content)?;
    metadata.apply(function);
    debug!("Applied metadata from {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function() -> Function {
        Function::new("api", "/src/functions/api", "python3.13", "app.py")
    }

    #[test]
    fn test_full_overlay() {
        let metadata = FunctionMetadata::parse(
            "api",
            r#"{"timeout": 60, "memory": 512, "http": {"method": "POST", "path": "/orders"}}"#,
        )
        .unwrap();
        let mut f = function();
        metadata.apply(&mut f);

        assert_eq!(f.timeout, Some(60));
        assert_eq!(f.memory, Some(512));
        assert_eq!(
            f.http,
            Some(HttpRoute {
                method: "POST".to_string(),
                path: "/orders".to_string()
            })
        );
    }

    #[test]
    fn test_zero_keeps_default() {
        let metadata = FunctionMetadata::parse("api", r#"{"timeout": 0, "memory": -1}"#).unwrap();
        let mut f = function();
        metadata.apply(&mut f);

        assert_eq!(f.timeout, None);
        assert_eq!(f.memory, None);
    }

    #[test]
    fn test_partial_http_route_ignored() {
        let metadata =
            FunctionMetadata::parse("api", r#"{"http": {"method": "GET", "path": ""}}"#).unwrap();
        let mut f = function();
        metadata.apply(&mut f);

        assert_eq!(f.http, None);
    }

    #[test]
    fn test_empty_object_changes_nothing() {
        let metadata = FunctionMetadata::parse("api", "{}").unwrap();
        let mut f = function();
        metadata.apply(&mut f);

        assert_eq!(f, function());
    }

    #[test]
    fn test_malformed_json_names_function() {
        let err = FunctionMetadata::parse("api", "{ timeout: ").unwrap_err();
        match err {
            DiscoveryError::MetadataParse { function, .. } => assert_eq!(function, "api"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
