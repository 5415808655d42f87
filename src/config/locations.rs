//! Logical location tokens used in destination templates.
//!
//! Destinations are declared relative to a token rather than as absolute
//! paths: `~` or `$HOME` for the home directory and `$CONFIG` for the
//! platform's application-config directory. Any other `$VAR` is looked up in
//! the process environment.
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::platform::Platform;

/// Resolved values for the location tokens of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// Value of `~` and `$HOME`.
    pub home: PathBuf,
    /// Value of `$CONFIG`.
    pub config: PathBuf,
}

impl Locations {
    /// Resolve locations for the current user, or relative to `home_override`.
    ///
    /// When the home directory is overridden, `$CONFIG` is derived from it
    /// using the platform's layout so that nothing escapes the override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHome`] if no override is given and the home
    /// directory cannot be determined.
    pub fn resolve(home_override: Option<&Path>, platform: &Platform) -> Result<Self, ConfigError> {
        if let Some(home) = home_override {
            return Ok(Self::under(home, platform));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        let config = dirs::config_dir().unwrap_or_else(|| platform.config_dir_under(&home));
        Ok(Self { home, config })
    }

    /// Locations rooted at `home` with the platform's default config layout.
    #[must_use]
    pub fn under(home: &Path, platform: &Platform) -> Self {
        Self {
            home: home.to_path_buf(),
            config: platform.config_dir_under(home),
        }
    }

    /// Expand the tokens in a destination template into an absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Location`] if a variable is undefined, a location
    /// is not valid UTF-8, or the expanded path is not absolute.
    pub fn expand(&self, template: &str) -> Result<PathBuf, ConfigError> {
        let fail = |reason: String| ConfigError::Location {
            template: template.to_string(),
            reason,
        };
        let home = utf8(&self.home).map_err(&fail)?;
        let config = utf8(&self.config).map_err(&fail)?;

        let expanded = shellexpand::full_with_context(
            template,
            || Some(home),
            |var: &str| -> Result<Option<String>, std::env::VarError> {
                match var {
                    "HOME" => Ok(Some(home.to_string())),
                    "CONFIG" => Ok(Some(config.to_string())),
                    other => std::env::var(other).map(Some),
                }
            },
        )
        .map_err(|e| fail(format!("${}: {}", e.var_name, e.cause)))?;

        let path = PathBuf::from(expanded.as_ref());
        if !path.is_absolute() {
            return Err(fail(format!(
                "expands to a relative path: {}",
                path.display()
            )));
        }
        Ok(path)
    }
}

fn utf8(path: &Path) -> Result<&str, String> {
    path.to_str()
        .ok_or_else(|| format!("location is not valid UTF-8: {}", path.display()))
}
