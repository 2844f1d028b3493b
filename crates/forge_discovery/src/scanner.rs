//! Functions directory scanning and runtime detection.

use std::fs;
use std::path::{Path, PathBuf};

use forge_build::runtime;
use tracing::{debug, info};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::function::Function;
use crate::metadata::load_metadata;

/// Where and how to look for functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Functions directory, relative to the project root
    pub functions_dir: PathBuf,
    /// Metadata file name inside each function directory
    pub metadata_file: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            functions_dir: PathBuf::from("src").join("functions"),
            metadata_file: "function.forge.json".to_string(),
        }
    }
}

impl ScanOptions {
    pub fn with_functions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.functions_dir = dir.into();
        self
    }

    pub fn with_metadata_file(mut self, name: impl Into<String>) -> Self {
        self.metadata_file = name.into();
        self
    }
}

/// How a directory is recognised as a function.
#[derive(Debug, Clone, Copy)]
enum EntryMatch {
    /// A file with exactly this name
    File(&'static str),
    /// Any file with this extension
    Extension(&'static str),
}

/// Detection rules in priority order; the first match wins.
const RULES: &[(EntryMatch, &str, &str)] = &[
    (EntryMatch::File("main.go"), runtime::GO, "main.go"),
    (EntryMatch::Extension("go"), runtime::GO, "*.go"),
    (EntryMatch::File("index.js"), runtime::NODE, "index.js"),
    (EntryMatch::File("index.mjs"), runtime::NODE, "index.mjs"),
    (EntryMatch::File("handler.js"), runtime::NODE, "handler.js"),
    (EntryMatch::File("app.py"), runtime::PYTHON, "app.py"),
    (EntryMatch::File("lambda_function.py"), runtime::PYTHON, "lambda_function.py"),
    (EntryMatch::File("handler.py"), runtime::PYTHON, "handler.py"),
    (EntryMatch::File("pom.xml"), runtime::JAVA, "pom.xml"),
];

fn has_extension(dir: &Path, extension: &str) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(Result::ok).any(|entry| {
                let path = entry.path();
                path.is_file() && path.extension().is_some_and(|ext| ext == extension)
            })
        })
        .unwrap_or(false)
}

/// Detect the runtime and entry point of a function directory.
pub fn detect_runtime(dir: &Path) -> Option<(&'static str, &'static str)> {
    RULES.iter().find_map(|(matcher, runtime, entry)| {
        let matched = match matcher {
            EntryMatch::File(name) => dir.join(name).is_file(),
            EntryMatch::Extension(ext) => has_extension(dir, ext),
        };
        matched.then_some((*runtime, *entry))
    })
}

/// Scan `<root>/src/functions` with default options.
pub fn scan_functions(root: &Path) -> DiscoveryResult<Vec<Function>> {
    scan_functions_with(root, &ScanOptions::default())
}

/// Discover every function under the configured functions directory.
///
/// Immediate subdirectories are classified by their entry files. Files and
/// directories without a recognised entry file are skipped. The result is
/// sorted by function name.
pub fn scan_functions_with(root: &Path, options: &ScanOptions) -> DiscoveryResult<Vec<Function>> {
    let functions_dir = root.join(&options.functions_dir);
    if !functions_dir.is_dir() {
        return Err(DiscoveryError::NotFound(functions_dir));
    }

    let mut functions = Vec::new();
    for entry in fs::read_dir(&functions_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let Some((runtime, entry_point)) = detect_runtime(&path) else {
            debug!("Skipping {:?}: no recognised entry point", path);
            continue;
        };

        let mut function = Function::new(&name, path, runtime, entry_point);
        load_metadata(&mut function, &options.metadata_file)?;
        debug!("Discovered function {} ({})", function.name, function.runtime);
        functions.push(function);
    }

    if functions.is_empty() {
        return Err(DiscoveryError::Empty(functions_dir));
    }

    functions.sort_by(|a, b| a.name.cmp(&b.name));
    info!("Discovered {} function(s) in {:?}", functions.len(), functions_dir);
    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn function_dir(root: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.join("src/functions").join(name);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_rule_priority() {
        let temp = TempDir::new().unwrap();
        let cases: &[(&[&str], &str, &str)] = &[
            (&["main.go", "index.js"], runtime::GO, "main.go"),
            (&["util.go", "app.py"], runtime::GO, "*.go"),
            (&["handler.js", "index.mjs"], runtime::NODE, "index.mjs"),
            (&["handler.js", "handler.py"], runtime::NODE, "handler.js"),
            (&["handler.py", "lambda_function.py"], runtime::PYTHON, "lambda_function.py"),
            (&["app.py", "pom.xml"], runtime::PYTHON, "app.py"),
            (&["pom.xml"], runtime::JAVA, "pom.xml"),
        ];

        for (i, (files, runtime, entry)) in cases.iter().enumerate() {
            let dir = function_dir(temp.path(), &format!("case{}", i), files);
            assert_eq!(detect_runtime(&dir), Some((*runtime, *entry)), "case {:?}", files);
        }
    }

    #[test]
    fn test_no_match() {
        let temp = TempDir::new().unwrap();
        let dir = function_dir(temp.path(), "docs", &["README.md"]);
        assert_eq!(detect_runtime(&dir), None);
    }

    #[test]
    fn test_go_extension_ignores_directories() {
        let temp = TempDir::new().unwrap();
        let dir = function_dir(temp.path(), "odd", &[]);
        fs::create_dir_all(dir.join("vendor.go")).unwrap();
        assert_eq!(detect_runtime(&dir), None);
    }

    #[test]
    fn test_custom_functions_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("lambdas/api");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.js"), "").unwrap();

        let options = ScanOptions::default().with_functions_dir("lambdas");
        let functions = scan_functions_with(temp.path(), &options).unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "api");
        assert_eq!(functions[0].path, dir);
    }

    #[test]
    fn test_custom_metadata_file() {
        let temp = TempDir::new().unwrap();
        let dir = function_dir(temp.path(), "api", &["app.py"]);
        fs::write(dir.join("meta.json"), r#"{"memory": 1024}"#).unwrap();

        let options = ScanOptions::default().with_metadata_file("meta.json");
        let functions = scan_functions_with(temp.path(), &options).unwrap();
        assert_eq!(functions[0].memory, Some(1024));
    }
}
