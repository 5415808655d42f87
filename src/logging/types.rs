//! Core logging types: category entries, status, and the [`Log`] trait.

/// Per-category result for summary reporting.
#[derive(Debug, Clone)]
pub struct CategoryEntry {
    /// Category name.
    pub name: String,
    /// Final status of the category.
    pub status: CategoryStatus,
    /// Optional detail message (e.g. file counts or failure count).
    pub message: Option<String>,
}

/// Status of a processed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus {
    /// Every file was placed.
    Ok,
    /// No file mapping targets the current platform.
    NotApplicable,
    /// Dry run; actions were reported but not performed.
    DryRun,
    /// At least one file could not be placed.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; tests
/// substitute recorders so placement code can be checked without a terminal.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Log unified diff text, one or more lines.
    fn patch(&self, text: &str);
    /// Record a category result for the summary.
    fn record_category(&self, name: &str, status: CategoryStatus, message: Option<&str>);
}
