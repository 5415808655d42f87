//! Read-only comparison of repository files against their destinations.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use similar::TextDiff;
use walkdir::WalkDir;

use super::placement::{self, Mode};
use crate::error::InstallFailure;

/// Outcome of comparing one source with its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    /// Same content (a symlink to the source counts).
    Identical,
    /// Both exist with different content.
    Differs,
    /// The source exists but the destination does not.
    MissingAtDestination,
    /// The destination exists but the source does not.
    MissingInSource,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identical => "identical",
            Self::Differs => "differs",
            Self::MissingAtDestination => "missing at destination",
            Self::MissingInSource => "missing in source",
        })
    }
}

/// One compared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Repository path.
    pub source: PathBuf,
    /// Destination path.
    pub destination: PathBuf,
    /// Comparison result.
    pub status: DiffStatus,
}

/// Compare a single source file with a destination, following symlinks.
///
/// # Errors
///
/// Returns an error if either side exists but cannot be read.
pub fn compare_file(source: &Path, destination: &Path) -> io::Result<DiffStatus> {
    if !source.exists() {
        return Ok(DiffStatus::MissingInSource);
    }
    if !destination.exists() {
        return Ok(DiffStatus::MissingAtDestination);
    }
    Ok(if sha256(source)? == sha256(destination)? {
        DiffStatus::Identical
    } else {
        DiffStatus::Differs
    })
}

/// Everything found while comparing one mapping.
#[derive(Debug, Default)]
pub struct MappingDiff {
    /// Files that could be compared.
    pub files: Vec<FileDiff>,
    /// Files or directories that could not be read. Their siblings are still
    /// compared.
    pub failures: Vec<InstallFailure>,
}

/// Compare a mapping, expanding directory sources the same way installation
/// does.
///
/// Files under a destination directory with no counterpart in the source
/// directory are reported as [`DiffStatus::MissingInSource`]. Destination
/// subdirectories that do not exist in the source are not descended into,
/// so application state stored next to managed files stays out of the report.
#[must_use]
pub fn compare_mapping(source: &Path, destination: &Path) -> MappingDiff {
    let mut result = MappingDiff::default();

    let placements = match placement::expand_source(source, destination, Mode::Copy) {
        Ok(placements) => placements,
        Err(failure) => {
            result.failures.push(failure);
            return result;
        }
    };
    for p in placements {
        match compare_file(&p.source, &p.destination) {
            Ok(status) => result.files.push(FileDiff {
                source: p.source,
                destination: p.destination,
                status,
            }),
            Err(e) => result
                .failures
                .push(InstallFailure::new("compare", p.destination, e)),
        }
    }

    if source.is_dir() && destination.is_dir() {
        collect_extras(source, destination, &mut result);
    }
    result
}

fn collect_extras(source: &Path, destination: &Path, result: &mut MappingDiff) {
    let walker = WalkDir::new(destination)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !e.file_type().is_dir()
                || e
                    .path()
                    .strip_prefix(destination)
                    .is_ok_and(|relative| source.join(relative).is_dir())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(destination).to_path_buf();
                result
                    .failures
                    .push(InstallFailure::new("walk destination", path, io::Error::from(e)));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(destination) else {
            continue;
        };
        let counterpart = source.join(relative);
        if !counterpart.exists() {
            result.files.push(FileDiff {
                source: counterpart,
                destination: entry.path().to_path_buf(),
                status: DiffStatus::MissingInSource,
            });
        }
    }
}

/// Unified diff from `source` to `destination` with no context lines.
///
/// A missing side reads as empty. If either side is not UTF-8 the result is
/// a single `Binary files ... differ` line.
///
/// # Errors
///
/// Returns an error if a side exists but cannot be read.
pub fn unified_diff(source: &Path, destination: &Path) -> io::Result<String> {
    let (Some(old), Some(new)) = (read_text(source)?, read_text(destination)?) else {
        return Ok(format!(
            "Binary files {} and {} differ\n",
            source.display(),
            destination.display()
        ));
    };
    let patch = TextDiff::from_lines(&old, &new)
        .unified_diff()
        .context_radius(0)
        .header(
            &source.display().to_string(),
            &destination.display().to_string(),
        )
        .to_string();
    Ok(patch)
}

/// File content as text; empty if the file does not exist, `None` if it is
/// not UTF-8.
fn read_text(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8(bytes).ok()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Some(String::new())),
        Err(e) => Err(e),
    }
}

/// SHA-256 digest of a file's content (following symlinks), as lowercase hex.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256(path: &Path) -> io::Result<String> {
    use std::fmt::Write as _;

    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}
