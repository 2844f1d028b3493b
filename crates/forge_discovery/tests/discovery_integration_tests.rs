//! Integration tests for function discovery.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use forge_discovery::{
    build_dir, create_stub_zips, scan_functions, to_build_config, DiscoveryError, FunctionDefaults,
    HttpRoute,
};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Test discovery of a mixed-runtime project.
#[test]
fn test_scan_mixed_project() {
    let temp = tempdir().unwrap();
    let root = temp.path();

    write(root, "src/functions/worker/main.go", "package main");
    write(root, "src/functions/api/app.py", "def handler(e, c): pass");
    write(root, "src/functions/web/index.js", "exports.handler = 1");
    write(root, "src/functions/billing/pom.xml", "<project/>");
    write(root, "src/functions/notes/README.md", "not a function");
    write(root, "src/functions/stray.py", "not a directory");

    let functions = scan_functions(root).unwrap();

    let summary: Vec<_> = functions
        .iter()
        .map(|f| (f.name.as_str(), f.runtime.as_str(), f.entry_point.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("api", "python3.13", "app.py"),
            ("billing", "java21", "pom.xml"),
            ("web", "nodejs20.x", "index.js"),
            ("worker", "provided.al2023", "main.go"),
        ]
    );
    assert!(functions.iter().all(|f| f.timeout.is_none() && f.http.is_none()));
}

/// Test that metadata overlays only the fields it sets.
#[test]
fn test_metadata_overlay() {
    let temp = tempdir().unwrap();
    let root = temp.path();

    write(root, "src/functions/api/index.mjs", "export const handler = 1");
    write(
        root,
        "src/functions/api/function.forge.json",
        r#"{"timeout": 90, "http": {"method": "GET", "path": "/health"}}"#,
    );

    let functions = scan_functions(root).unwrap();
    let api = &functions[0];
    let defaults = FunctionDefaults::default();

    assert_eq!(api.timeout_or(&defaults), 90);
    assert_eq!(api.memory_or(&defaults), 256);
    assert_eq!(
        api.http,
        Some(HttpRoute {
            method: "GET".to_string(),
            path: "/health".to_string()
        })
    );
}

/// Test that malformed metadata fails discovery and names the function.
#[test]
fn test_malformed_metadata_is_fatal() {
    let temp = tempdir().unwrap();
    let root = temp.path();

    write(root, "src/functions/api/app.py", "");
    write(root, "src/functions/api/function.forge.json", "{not json");
    write(root, "src/functions/web/index.js", "");

    match scan_functions(root) {
        Err(DiscoveryError::MetadataParse { function, .. }) => assert_eq!(function, "api"),
        other => panic!("expected metadata error, got {:?}", other),
    }
}

/// Test the missing and empty directory errors.
#[test]
fn test_not_found_and_empty() {
    let temp = tempdir().unwrap();
    let root = temp.path();

    assert!(matches!(scan_functions(root), Err(DiscoveryError::NotFound(_))));

    fs::create_dir_all(root.join("src/functions/docs")).unwrap();
    write(root, "src/functions/docs/notes.txt", "");
    match scan_functions(root) {
        Err(DiscoveryError::Empty(path)) => assert!(path.ends_with("src/functions")),
        other => panic!("expected empty error, got {:?}", other),
    }
}

/// Test discovery followed by stubs and build configuration.
#[test]
fn test_discover_stub_and_configure() {
    let temp = tempdir().unwrap();
    let root = temp.path();

    for name in ["a", "b", "c"] {
        write(root, &format!("src/functions/{}/handler.py", name), "");
    }

    let functions = scan_functions(root).unwrap();
    assert_eq!(functions.len(), 3);

    let build = build_dir(root);
    assert_eq!(create_stub_zips(&functions, &build).unwrap(), 3);

    for function in &functions {
        let config = to_build_config(function, &build).unwrap();
        assert!(config.output_path.exists());
        assert_eq!(config.output_path, build.join(format!("{}.zip", function.name)));
        assert_eq!(config.handler, "handler");
    }
}
