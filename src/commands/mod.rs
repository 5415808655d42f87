pub mod diff;
pub mod install;
pub mod list;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::categories::Category;
use crate::config::locations::Locations;
use crate::config::{Config, DECLARATION_FILE, FILES_DIR};
use crate::error::ConfigError;
use crate::logging::Logger;
use crate::plan::{CategoryGraph, Plan};
use crate::platform::Platform;

/// Version string reported by `dotfiles version` and the log header.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, root discovery, declaration loading and
/// graph construction so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Repository root.
    pub root: PathBuf,
    /// Resolved location tokens.
    pub locations: Locations,
    /// The category graph, built once.
    pub graph: CategoryGraph,
}

impl CommandSetup {
    /// Detect the platform, find the repository, and load the declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined, the
    /// declaration fails to load, or the home directory is unknown.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;
        log.debug(&format!("dotfiles {} on {}", version(), platform.os));
        log.debug(&format!("root: {}", root.display()));

        log.stage("Loading configuration");
        let config = Config::load(&root, &platform)
            .with_context(|| format!("loading {}", root.join(DECLARATION_FILE).display()))?;
        log.info(&format!("loaded {} categories", config.categories.len()));

        // Validate configuration and display warnings
        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.category, warning.item, warning.message
                ));
            }
        }

        let home = global
            .home
            .as_deref()
            .map(std::path::absolute)
            .transpose()
            .context("resolving --home")?;
        let locations = Locations::resolve(home.as_deref(), &platform)?;
        log.debug(&format!("home: {}", locations.home.display()));
        log.debug(&format!("config: {}", locations.config.display()));

        let graph = CategoryGraph::new(config.categories)?;

        Ok(Self {
            platform,
            root,
            locations,
            graph,
        })
    }

    /// Directory containing the source files.
    #[must_use]
    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    /// Resolve `requested` and expand every destination of the plan.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails or any destination template
    /// cannot be expanded. Nothing has been written at that point.
    pub fn plan(&self, requested: &[String], log: &Logger) -> Result<Vec<PlannedCategory<'_>>> {
        log.stage("Resolving categories");
        let plan = self.graph.resolve(requested)?;
        log.info(&format!("plan: {}", plan.names().join(", ")));
        Ok(expand_plan(&plan, &self.files_dir(), &self.locations)?)
    }
}

/// One source/destination pair with every location token expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Absolute path inside the repository (file or directory).
    pub source: PathBuf,
    /// Absolute destination path.
    pub destination: PathBuf,
}

/// A category from the plan together with its expanded targets.
#[derive(Debug, Clone)]
pub struct PlannedCategory<'g> {
    /// The category.
    pub category: &'g Category,
    /// Targets of its active mappings, in declared order.
    pub targets: Vec<Target>,
}

/// Expand the destinations of every active mapping in `plan`.
///
/// # Errors
///
/// Returns [`ConfigError::Location`] for the first template that cannot be
/// expanded.
pub fn expand_plan<'g>(
    plan: &Plan<'g>,
    files_dir: &Path,
    locations: &Locations,
) -> Result<Vec<PlannedCategory<'g>>, ConfigError> {
    plan.categories()
        .iter()
        .map(|&category| -> Result<PlannedCategory<'g>, ConfigError> {
            let targets = category
                .files
                .iter()
                .filter_map(|mapping| {
                    let template = mapping.target.as_deref()?;
                    Some(locations.expand(template).map(|destination| Target {
                        source: files_dir.join(&mapping.source),
                        destination,
                    }))
                })
                .collect::<Result<Vec<_>, ConfigError>>()?;
            Ok(PlannedCategory { category, targets })
        })
        .collect()
}

/// Resolve the dotfiles root directory from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if the root directory cannot be determined or doesn't exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    find_root(
        global.root.as_deref(),
        std::env::var_os("DOTFILES_ROOT"),
        std::env::current_exe().ok(),
        std::env::current_dir().ok(),
    )
}

/// Root discovery with every input passed in: explicit flag, then
/// `DOTFILES_ROOT`, then the binary's location, then the current directory
/// and its ancestors.
fn find_root(
    explicit: Option<&Path>,
    env_root: Option<OsString>,
    exe: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return canonical(root);
    }
    if let Some(root) = env_root.filter(|r| !r.is_empty()) {
        return canonical(Path::new(&root));
    }

    if let Some(parent) = exe.as_deref().and_then(Path::parent) {
        // target/release/ or bin/ inside the repository
        let candidates = [parent.join("../.."), parent.join("..")];
        for candidate in &candidates {
            if is_root(candidate) {
                return canonical(candidate);
            }
        }
    }

    if let Some(cwd) = cwd
        && let Some(found) = cwd.ancestors().find(|dir| is_root(dir))
    {
        return canonical(found);
    }

    anyhow::bail!("cannot determine dotfiles root. Use --root or set DOTFILES_ROOT env var");
}

fn is_root(dir: &Path) -> bool {
    dir.join(DECLARATION_FILE).is_file()
}

fn canonical(root: &Path) -> Result<PathBuf> {
    dunce::canonicalize(root)
        .with_context(|| format!("dotfiles root does not exist: {}", root.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::categories::FileMapping;
    use crate::platform::Os;

    fn repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("conf")).unwrap();
        std::fs::write(dir.path().join(DECLARATION_FILE), "").unwrap();
        dir
    }

    #[test]
    fn find_root_prefers_explicit_root() {
        let explicit = repo();
        let env = repo();
        let root = find_root(
            Some(explicit.path()),
            Some(env.path().as_os_str().to_owned()),
            None,
            None,
        )
        .unwrap();
        assert_eq!(root, dunce::canonicalize(explicit.path()).unwrap());
    }

    #[test]
    fn find_root_uses_env_before_detection() {
        let env = repo();
        let cwd = repo();
        let root = find_root(
            None,
            Some(env.path().as_os_str().to_owned()),
            None,
            Some(cwd.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(root, dunce::canonicalize(env.path()).unwrap());
    }

    #[test]
    fn find_root_detects_from_binary_location() {
        let dir = repo();
        std::fs::create_dir_all(dir.path().join("target/release")).unwrap();
        let exe = dir.path().join("target/release/dotfiles");
        let root = find_root(None, None, Some(exe), None).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn find_root_walks_up_from_cwd() {
        let dir = repo();
        let nested = dir.path().join("files/sh");
        std::fs::create_dir_all(&nested).unwrap();
        let root = find_root(None, None, None, Some(nested)).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn find_root_errors_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_root(None, None, None, Some(dir.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("cannot determine dotfiles root"));
    }

    #[test]
    fn find_root_errors_for_missing_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_root(Some(&dir.path().join("gone")), None, None, None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    fn category(name: &str, files: &[(&str, Option<&str>)]) -> Category {
        Category {
            name: name.to_string(),
            depends: vec![],
            files: files
                .iter()
                .map(|(source, target)| FileMapping {
                    source: PathBuf::from(source),
                    target: target.map(String::from),
                })
                .collect(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn expand_plan_skips_inactive_mappings() {
        let graph = CategoryGraph::new(vec![category(
            "zsh",
            &[
                ("zsh/zshrc.local", Some("~/.zshrc.local")),
                ("zsh/windows-only", None),
            ],
        )])
        .unwrap();
        let plan = graph.resolve(&["zsh"]).unwrap();
        let locations = Locations::under(Path::new("/home/u"), &Platform::new(Os::Linux));

        let planned = expand_plan(&plan, Path::new("/repo/files"), &locations).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(
            planned[0].targets,
            [Target {
                source: PathBuf::from("/repo/files/zsh/zshrc.local"),
                destination: PathBuf::from("/home/u/.zshrc.local"),
            }]
        );
    }

    #[test]
    fn expand_plan_fails_on_undefined_variable() {
        let graph = CategoryGraph::new(vec![category(
            "x",
            &[("x/y", Some("$DOTFILES_TEST_SURELY_UNDEFINED_VAR/y"))],
        )])
        .unwrap();
        let plan = graph.resolve(&["x"]).unwrap();
        let locations = Locations::under(Path::new("/home/u"), &Platform::new(Os::Linux));
        assert!(matches!(
            expand_plan(&plan, Path::new("/repo/files"), &locations).unwrap_err(),
            ConfigError::Location { .. }
        ));
    }
}
