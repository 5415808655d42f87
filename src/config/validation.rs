use std::collections::HashMap;
use std::path::Path;

use super::categories::Category;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The category that triggered the warning.
    pub category: String,
    /// The specific item (usually a source path).
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
///
/// Validators report problems that do not prevent resolution but will
/// surface as per-file failures or surprises at install time.
pub trait ConfigValidator {
    /// Validate the declaration against the repository at `files_dir`.
    fn validate(&self, files_dir: &Path) -> Vec<ValidationWarning>;
}

/// Warns about sources that do not exist in the repository.
#[derive(Debug)]
pub struct SourceValidator<'a> {
    categories: &'a [Category],
}

impl<'a> SourceValidator<'a> {
    /// Validate the sources of `categories`.
    #[must_use]
    pub const fn new(categories: &'a [Category]) -> Self {
        Self { categories }
    }
}

impl ConfigValidator for SourceValidator<'_> {
    fn validate(&self, files_dir: &Path) -> Vec<ValidationWarning> {
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .files
                    .iter()
                    .filter(|mapping| mapping.target.is_some())
                    .filter(|mapping| !files_dir.join(&mapping.source).exists())
                    .map(|mapping| {
                        ValidationWarning::new(
                            &category.name,
                            mapping.source.display().to_string(),
                            format!(
                                "source file does not exist: {}",
                                files_dir.join(&mapping.source).display()
                            ),
                        )
                    })
            })
            .collect()
    }
}

/// Warns when two mappings write the same destination template; the later
/// category silently overwrites the earlier one.
#[derive(Debug)]
pub struct DestinationValidator<'a> {
    categories: &'a [Category],
}

impl<'a> DestinationValidator<'a> {
    /// Validate the destinations of `categories`.
    #[must_use]
    pub const fn new(categories: &'a [Category]) -> Self {
        Self { categories }
    }
}

impl ConfigValidator for DestinationValidator<'_> {
    fn validate(&self, _files_dir: &Path) -> Vec<ValidationWarning> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let mut warnings = Vec::new();

        for category in self.categories {
            for mapping in &category.files {
                let Some(target) = mapping.target.as_deref() else {
                    continue;
                };
                if let Some(first) = seen.insert(target, category.name.as_str()) {
                    warnings.push(ValidationWarning::new(
                        &category.name,
                        mapping.source.display().to_string(),
                        format!("destination {target} is also declared by '{first}'"),
                    ));
                }
            }
        }

        warnings
    }
}

/// Run every validator over `categories`.
#[must_use]
pub fn validate_all(categories: &[Category], files_dir: &Path) -> Vec<ValidationWarning> {
    let validators: [&dyn ConfigValidator; 2] = [
        &SourceValidator::new(categories),
        &DestinationValidator::new(categories),
    ];
    validators
        .iter()
        .flat_map(|v| v.validate(files_dir))
        .collect()
}
