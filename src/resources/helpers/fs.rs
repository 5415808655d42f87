//! File-system primitives shared by placement and comparison.
use std::io;
use std::path::Path;

/// What currently occupies a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    /// Nothing is there.
    Absent,
    /// A regular file.
    File,
    /// A symlink, possibly broken.
    Symlink,
    /// A real directory with no entries.
    EmptyDir,
    /// A real directory with at least one entry.
    NonEmptyDir,
}

/// Inspect `path` without following a symlink at the final component.
///
/// # Errors
///
/// Returns an error if the metadata or directory listing cannot be read for
/// any reason other than the path not existing.
pub fn inspect(path: &Path) -> io::Result<Existing> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Existing::Absent),
        Err(e) => return Err(e),
    };
    if meta.file_type().is_symlink() {
        return Ok(Existing::Symlink);
    }
    if meta.is_dir() {
        let mut entries = std::fs::read_dir(path)?;
        return Ok(if entries.next().is_some() {
            Existing::NonEmptyDir
        } else {
            Existing::EmptyDir
        });
    }
    Ok(Existing::File)
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Remove whatever `inspect` found at `path`.
///
/// Non-empty directories are never removed; callers must reject them before
/// getting here.
///
/// # Errors
///
/// Returns an error if the entry cannot be removed, or
/// [`io::ErrorKind::DirectoryNotEmpty`] for a non-empty directory.
pub fn remove_existing(path: &Path, existing: Existing) -> io::Result<()> {
    match existing {
        Existing::Absent => Ok(()),
        Existing::File => std::fs::remove_file(path),
        Existing::EmptyDir => std::fs::remove_dir(path),
        Existing::Symlink => remove_symlink(path),
        Existing::NonEmptyDir => Err(non_empty_dir()),
    }
}

/// The error reported for a destination that is a non-empty directory.
#[must_use]
pub fn non_empty_dir() -> io::Error {
    io::Error::new(
        io::ErrorKind::DirectoryNotEmpty,
        "destination is a non-empty directory",
    )
}

/// Whether the entry at `path` is the file at `source` itself.
///
/// The final component of `path` is not followed, so a symlink pointing at
/// `source` is a different entry. A parent directory that links into the
/// repository is followed, which makes `path` and `source` the same file.
#[must_use]
pub fn is_same_entry(path: &Path, source: &Path) -> bool {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    match (dunce::canonicalize(parent), dunce::canonicalize(source)) {
        (Ok(parent), Ok(source)) => parent.join(name) == source,
        _ => false,
    }
}

/// The error reported for a destination that is the source file itself.
#[must_use]
pub fn same_as_source() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "destination resolves to the source file",
    )
}

/// Create a symlink at `link` pointing to the file `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created. On Windows this requires
/// Developer Mode or an elevated process.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir`, and
/// `symlink_metadata().is_dir()` is `false` for them, so the raw
/// `FILE_ATTRIBUTE_DIRECTORY` flag is checked instead.
fn remove_symlink(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
