//! Category declaration loading.
//!
//! The declaration lives in `conf/categories.toml` as an array of tables so
//! that declaration order is preserved:
//!
//! ```toml
//! [[category]]
//! name = "zsh"
//! depends = ["sh"]
//! files = [
//!   { source = "zsh/zshrc.local", linux = "~/.zshrc.local", macos = "~/.zshrc.local" },
//! ]
//! ```
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use super::toml_loader;
use crate::error::ConfigError;
use crate::platform::{Os, Platform};

/// A named group of configuration files plus dependencies on other categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique category name.
    pub name: String,
    /// Names of categories that must be installed first, in declared order.
    pub depends: Vec<String>,
    /// File mappings, in declared order.
    pub files: Vec<FileMapping>,
}

impl Category {
    /// Whether at least one file mapping has a destination on this platform.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.files.iter().any(|f| f.target.is_some())
    }
}

/// A source file inside the repository and its destination template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    /// Path relative to the repository's `files/` directory.
    pub source: PathBuf,
    /// Destination template for the current platform (see
    /// [`Locations::expand`](super::locations::Locations::expand)); `None`
    /// when the mapping does not apply to this platform.
    pub target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Declaration {
    #[serde(default)]
    category: Vec<CategoryDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryDef {
    name: String,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    files: Vec<FileDef>,
}

/// A single `files` entry: either one `target` for every platform or
/// per-platform keys.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDef {
    source: String,
    target: Option<String>,
    linux: Option<String>,
    macos: Option<String>,
    windows: Option<String>,
}

impl FileDef {
    fn into_mapping(self, category: &str, platform: &Platform) -> Result<FileMapping, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidMapping {
            category: category.to_string(),
            source_path: self.source.clone(),
            reason: reason.to_string(),
        };

        let per_platform = self.linux.is_some() || self.macos.is_some() || self.windows.is_some();
        if self.target.is_some() && per_platform {
            return Err(invalid(
                "use either `target` or per-platform keys, not both",
            ));
        }
        if self.target.is_none() && !per_platform {
            return Err(invalid("no destination declared"));
        }
        check_source(&self.source).map_err(invalid)?;

        let target = if per_platform {
            match platform.os {
                Os::Linux => self.linux,
                Os::MacOs => self.macos,
                Os::Windows => self.windows,
            }
        } else {
            self.target
        };

        Ok(FileMapping {
            source: PathBuf::from(self.source),
            target,
        })
    }
}

/// Sources must stay inside the repository's `files/` directory.
fn check_source(source: &str) -> Result<(), &'static str> {
    let path = Path::new(source);
    if source.trim().is_empty() {
        return Err("source is empty");
    }
    if path.is_absolute() || source.starts_with('/') {
        return Err("source must be relative to files/");
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err("source must not leave files/");
    }
    Ok(())
}

/// Load the category declaration, selecting destinations for `platform`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a file
/// mapping is malformed.
pub fn load(path: &Path, platform: &Platform) -> Result<Vec<Category>, ConfigError> {
    let declaration: Declaration = toml_loader::load_config(path)?;

    declaration
        .category
        .into_iter()
        .map(|def| -> Result<Category, ConfigError> {
            let files = def
                .files
                .into_iter()
                .map(|f| f.into_mapping(&def.name, platform))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Category {
                name: def.name,
                depends: def.depends,
                files,
            })
        })
        .collect()
}
