//! Hashing utilities for checksums and content digests.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::BuildResult;
use crate::package::should_skip;

/// Directories produced by toolchains inside a source tree.
const GENERATED_DIRS: &[&str] = &["node_modules", "target"];

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> BuildResult<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    hash_reader(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compute a digest over every file in a source tree.
///
/// Files are visited in name order and each contributes its relative path and
/// contents, so the digest changes whenever a file is added, renamed or edited.
/// Packaging noise (`__pycache__`, `.git`, ...) and toolchain output
/// directories are ignored.
pub fn sha256_tree(root: &Path) -> BuildResult<String> {
    let mut hasher = Sha256::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || {
                let name = e.file_name().to_string_lossy();
                !should_skip(&name) && !GENERATED_DIRS.iter().any(|dir| *dir == name)
            }
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update(b"\0");

        let mut reader = BufReader::new(File::open(entry.path())?);
        hash_reader(&mut reader, &mut hasher)?;
        hasher.update(b"\0");
    }

    Ok(hex::encode(hasher.finalize()))
}

fn hash_reader(reader: &mut impl Read, hasher: &mut Sha256) -> BuildResult<()> {
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(())
}
