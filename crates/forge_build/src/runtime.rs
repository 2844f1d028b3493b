//! Runtime identifiers and handler conventions.

/// Go functions run on the custom `provided` runtime.
pub const GO: &str = "provided.al2023";
/// Default Node.js runtime.
pub const NODE: &str = "nodejs20.x";
/// Default Python runtime.
pub const PYTHON: &str = "python3.13";
/// Default Java runtime.
pub const JAVA: &str = "java21";

/// Runtimes served by the Go builder.
pub const GO_RUNTIMES: &[&str] = &["go1.x", "provided.al2", "provided.al2023"];

/// Runtimes served by the Python builder.
pub const PYTHON_RUNTIMES: &[&str] = &[
    "python3.9",
    "python3.10",
    "python3.11",
    "python3.12",
    "python3.13",
];

/// Runtimes served by the Node.js builder.
pub const NODE_RUNTIMES: &[&str] = &["nodejs18.x", "nodejs20.x", "nodejs22.x"];

/// Runtimes served by the Java builder.
pub const JAVA_RUNTIMES: &[&str] = &["java11", "java17", "java21"];

/// Default handler name for a runtime identifier.
pub fn handler_for(runtime: &str) -> &'static str {
    if runtime.starts_with("nodejs") {
        "index.handler"
    } else if runtime.starts_with("python") {
        "handler"
    } else if runtime.starts_with("java") {
        "Handler::handleRequest"
    } else {
        "bootstrap"
    }
}
