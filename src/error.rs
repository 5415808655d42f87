//! Domain-specific error types for the dotfiles installer.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError     declaration loading, location tokens (fatal)
//! ResolveError    unknown category, dependency cycle (fatal, before any write)
//! InstallFailure  one destination could not be placed (collected, run continues)
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while loading the category declaration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The declaration file could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The declaration file is not valid TOML or does not match the schema.
    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying deserialization error.
        source: toml::de::Error,
    },

    /// Two categories share the same name.
    #[error("Category '{0}' is declared more than once")]
    DuplicateCategory(String),

    /// A file mapping is malformed.
    #[error("Invalid file mapping in category '{category}' ({source_path}): {reason}")]
    InvalidMapping {
        /// Category that declares the mapping.
        category: String,
        /// Source path as written in the declaration.
        source_path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A destination template could not be expanded.
    #[error("Cannot expand destination '{template}': {reason}")]
    Location {
        /// The destination as declared.
        template: String,
        /// Why expansion failed.
        reason: String,
    },

    /// The home directory could not be determined.
    #[error("Cannot determine the home directory; use --home")]
    NoHome,
}

/// Errors that arise while resolving requested categories into a plan.
///
/// Both variants indicate a defect in the static declaration or the request,
/// so they abort the run before any filesystem mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A requested or depended-upon category is not declared.
    #[error("{}", unknown_message(.name, .required_by.as_deref()))]
    UnknownCategory {
        /// The undeclared name.
        name: String,
        /// The category whose dependency list names it, if any.
        required_by: Option<String>,
    },

    /// The dependency graph contains a cycle.
    #[error("Dependency cycle detected: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// The categories forming the cycle; the first name is repeated last.
        cycle: Vec<String>,
    },
}

fn unknown_message(name: &str, required_by: Option<&str>) -> String {
    required_by.map_or_else(
        || format!("Unknown category '{name}'"),
        |parent| format!("Unknown category '{name}' (required by '{parent}')"),
    )
}

/// A single destination that could not be placed.
///
/// Failures are isolated per file: the installer records them and moves on
/// to the next mapping.
#[derive(Error, Debug)]
#[error("{action} {}: {source}", .path.display())]
pub struct InstallFailure {
    /// The path the failing operation was acting on.
    pub path: PathBuf,
    /// Short description of the failed step (e.g. `"create parent"`).
    pub action: &'static str,
    /// Underlying I/O error.
    #[source]
    pub source: io::Error,
}

impl InstallFailure {
    /// Build a failure for `path` from an I/O error.
    #[must_use]
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            action,
            source,
        }
    }
}
