//! File placement: symlink or copy one repository file to its destination.
//!
//! [`place`] is the only code path that touches a destination. It inspects
//! the destination, decides the [`Action`], and performs it only when
//! `commit` is set, so a dry run reports exactly what a real run would do.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::helpers::fs::{self, Existing};
use crate::error::InstallFailure;

/// How a file reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Absolute symlink to the repository file; later edits show through.
    #[default]
    Symlink,
    /// Independent copy of bytes and permissions.
    Copy,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
        })
    }
}

/// One source file and the absolute path it should appear at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Absolute path of the file inside the repository.
    pub source: PathBuf,
    /// Absolute destination path.
    pub destination: PathBuf,
    /// Symlink or copy.
    pub mode: Mode,
}

impl Placement {
    /// Create a placement.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf, mode: Mode) -> Self {
        Self {
            source,
            destination,
            mode,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.mode,
            self.source.display(),
            self.destination.display()
        )
    }
}

/// What [`place`] does (or would do) at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing was there.
    Create,
    /// Something was there and is removed first.
    Replace(Replaced),
}

/// The kind of entry an [`Action::Replace`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    /// A regular file.
    File,
    /// A symlink, possibly broken.
    Symlink,
    /// An empty directory.
    EmptyDir,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Replace(Replaced::File) => "replace file",
            Self::Replace(Replaced::Symlink) => "replace symlink",
            Self::Replace(Replaced::EmptyDir) => "replace empty directory",
        })
    }
}

/// Place one file.
///
/// With `commit == false` nothing is written; the returned action and any
/// failure are the same ones a committed call would produce for the current
/// filesystem state.
///
/// # Errors
///
/// Returns an [`InstallFailure`] if the source is missing or not a file, the
/// destination is a non-empty directory or the source file itself (reached
/// through a linked parent directory), or any filesystem step fails.
pub fn place(placement: &Placement, commit: bool) -> Result<Action, InstallFailure> {
    let Placement {
        source,
        destination,
        mode,
    } = placement;

    let meta =
        std::fs::metadata(source).map_err(|e| InstallFailure::new("read source", source, e))?;
    if meta.is_dir() {
        return Err(InstallFailure::new(
            "read source",
            source,
            io::Error::new(io::ErrorKind::IsADirectory, "source is a directory"),
        ));
    }

    if fs::is_same_entry(destination, source) {
        return Err(InstallFailure::new(
            "replace destination",
            destination,
            fs::same_as_source(),
        ));
    }

    let existing = fs::inspect(destination)
        .map_err(|e| InstallFailure::new("inspect destination", destination, e))?;
    let action = match existing {
        Existing::Absent => Action::Create,
        Existing::File => Action::Replace(Replaced::File),
        Existing::Symlink => Action::Replace(Replaced::Symlink),
        Existing::EmptyDir => Action::Replace(Replaced::EmptyDir),
        Existing::NonEmptyDir => {
            return Err(InstallFailure::new(
                "replace destination",
                destination,
                fs::non_empty_dir(),
            ));
        }
    };

    if !commit {
        return Ok(action);
    }

    fs::ensure_parent_dir(destination)
        .map_err(|e| InstallFailure::new("create parent of", destination, e))?;
    fs::remove_existing(destination, existing)
        .map_err(|e| InstallFailure::new("remove existing", destination, e))?;

    match mode {
        Mode::Symlink => {
            let target = std::path::absolute(source)
                .map_err(|e| InstallFailure::new("resolve source", source, e))?;
            fs::create_symlink(&target, destination)
                .map_err(|e| InstallFailure::new("create symlink", destination, e))?;
        }
        Mode::Copy => {
            std::fs::copy(source, destination)
                .map_err(|e| InstallFailure::new("copy to", destination, e))?;
        }
    }

    Ok(action)
}

/// Expand a mapping into per-file placements.
///
/// A file source (or a missing one, which [`place`] then reports) yields a
/// single placement. A directory source yields one placement per regular file
/// beneath it, sorted by path, each destination mirroring the file's path
/// relative to the source directory.
///
/// # Errors
///
/// Returns an [`InstallFailure`] if the source directory cannot be walked.
pub fn expand_source(
    source: &Path,
    destination: &Path,
    mode: Mode,
) -> Result<Vec<Placement>, InstallFailure> {
    if !source.is_dir() {
        return Ok(vec![Placement::new(
            source.to_path_buf(),
            destination.to_path_buf(),
            mode,
        )]);
    }

    let mut placements = Vec::new();
    for entry in WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            InstallFailure::new("walk source", path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        placements.push(Placement::new(
            entry.path().to_path_buf(),
            destination.join(relative),
            mode,
        ));
    }
    Ok(placements)
}
