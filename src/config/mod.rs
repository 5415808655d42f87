pub mod categories;
pub mod locations;
pub mod toml_loader;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::platform::Platform;

/// Declaration file, relative to the repository root.
pub const DECLARATION_FILE: &str = "conf/categories.toml";

/// Directory holding every source file, relative to the repository root.
pub const FILES_DIR: &str = "files";

/// All loaded configuration for one invocation.
#[derive(Debug)]
pub struct Config {
    /// Repository root.
    pub root: PathBuf,
    /// Categories in declaration order, with destinations selected for the platform.
    pub categories: Vec<categories::Category>,
}

impl Config {
    /// Load the category declaration from `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration cannot be read or is malformed.
    pub fn load(root: &Path, platform: &Platform) -> Result<Self, ConfigError> {
        let categories = categories::load(&root.join(DECLARATION_FILE), platform)?;
        Ok(Self {
            root: root.to_path_buf(),
            categories,
        })
    }

    /// Directory containing the source files.
    #[must_use]
    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    /// Validate the configuration and return any warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(&self.categories, &self.files_dir())
    }
}
