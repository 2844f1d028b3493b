//! Deployment package (zip) creation.
//!
//! Entries are written in file-name order with a fixed modification time so
//! that packaging an unchanged tree twice yields byte-identical archives.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::BuildResult;

/// Comment stored in placeholder packages.
pub const STUB_COMMENT: &str = "Forge stub - will be replaced by actual build";

/// File and directory name suffixes never packaged.
const SKIP_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".pyd", "__pycache__", ".git", ".DS_Store"];

/// Whether a file or directory name is excluded from packages.
pub fn should_skip(name: &str) -> bool {
    SKIP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn file_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// An archive written to a temporary file beside its destination. The
/// destination is only replaced once the archive is complete, so a failed
/// build never leaves a truncated package behind.
struct Package<'a> {
    output: &'a Path,
    temp_path: PathBuf,
    writer: ZipWriter<NamedTempFile>,
}

impl<'a> Package<'a> {
    fn create(output: &'a Path) -> BuildResult<Self> {
        let parent = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let temp = tempfile::Builder::new()
            .prefix(".forge-package")
            .suffix(".tmp")
            .tempfile_in(parent)?;
        Ok(Self {
            output,
            temp_path: temp.path().to_path_buf(),
            writer: ZipWriter::new(temp),
        })
    }

    /// Paths the archive itself occupies, which must never be packaged.
    fn own_paths(&self) -> Vec<PathBuf> {
        [self.output, self.temp_path.as_path()]
            .iter()
            .filter_map(|p| fs::canonicalize(p).ok())
            .collect()
    }

    fn finish(self) -> BuildResult<()> {
        let temp = self.writer.finish()?;
        temp.persist(self.output).map_err(|e| e.error)?;
        Ok(())
    }
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write an empty placeholder package.
pub fn write_stub_zip(output: &Path) -> BuildResult<()> {
    let mut package = Package::create(output)?;
    package.writer.set_comment(STUB_COMMENT);
    package.finish()?;
    debug!("Wrote stub package {:?}", output);
    Ok(())
}

/// Package the contents of several directories into one archive.
///
/// Each directory's contents land at the archive root. When two directories
/// provide the same relative path, the first one listed wins. Returns the
/// number of entries written.
pub fn zip_directories(output: &Path, dirs: &[&Path]) -> BuildResult<usize> {
    let mut package = Package::create(output)?;
    let own_paths = package.own_paths();
    let mut seen = BTreeSet::new();

    for dir in dirs {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !should_skip(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            // The archive may be written inside one of the packaged directories.
            if own_paths.iter().any(|p| p.file_name() == Some(entry.file_name()))
                && fs::canonicalize(entry.path()).is_ok_and(|p| own_paths.contains(&p))
            {
                continue;
            }

            let name = entry_name(dir, entry.path());
            if !seen.insert(name.clone()) {
                continue;
            }

            package.writer.start_file(name.as_str(), file_options(0o644))?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut package.writer)?;
        }
    }

    package.finish()?;
    debug!("Packaged {} file(s) into {:?}", seen.len(), output);
    Ok(seen.len())
}

/// Package a single file under the given entry name.
pub fn zip_file_as(output: &Path, file: &Path, name: &str, mode: u32) -> BuildResult<()> {
    let mut package = Package::create(output)?;
    package.writer.start_file(name, file_options(mode))?;
    let mut source = File::open(file)?;
    io::copy(&mut source, &mut package.writer)?;
    package.finish()
}
