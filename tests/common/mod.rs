// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed dotfiles repository plus a separate
// fake home directory, and a fluent builder so each integration test can set
// up an isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use dotfiles_installer::commands::{self, PlannedCategory};
use dotfiles_installer::config::Config;
use dotfiles_installer::config::locations::Locations;
use dotfiles_installer::logging::{CategoryStatus, Log};
use dotfiles_installer::plan::CategoryGraph;
use dotfiles_installer::platform::Platform;

/// Declaration used by most tests: `sh` is a dependency of `bash` and `zsh`,
/// `git` is independent, and `vscode` maps a whole directory.
pub const DECLARATION: &str = r#"
[[category]]
name = "sh"
files = [
  { source = "sh/inputrc", target = "~/.inputrc" },
  { source = "sh/profile", target = "$HOME/.profile" },
]

[[category]]
name = "bash"
depends = ["sh"]
files = [{ source = "bash/bashrc", target = "~/.bashrc" }]

[[category]]
name = "zsh"
depends = ["sh"]
files = [{ source = "zsh/zshrc.local", target = "~/.zshrc.local" }]

[[category]]
name = "git"
files = [{ source = "git/config", target = "$CONFIG/git/config" }]

[[category]]
name = "vscode"
files = [{ source = "vscode/User", target = "$CONFIG/Code/User" }]
"#;

/// An isolated repository and home directory backed by a [`tempfile::TempDir`].
///
/// Both are deleted when dropped.
pub struct TestRepo {
    dir: tempfile::TempDir,
}

impl TestRepo {
    /// Repository root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    /// Fake home directory passed as `--home`.
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Cache directory for log files, so tests never write to the real one.
    pub fn cache(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Path of `relative` under the repository's `files/` directory.
    pub fn source(&self, relative: &str) -> PathBuf {
        self.root().join("files").join(relative)
    }

    /// Path of `relative` under the fake home directory.
    pub fn dest(&self, relative: &str) -> PathBuf {
        self.home().join(relative)
    }

    /// Locations rooted at the fake home for the current platform.
    pub fn locations(&self) -> Locations {
        Locations::under(&self.home(), &Platform::detect())
    }

    /// Load the declaration and build the graph for the current platform.
    pub fn graph(&self) -> CategoryGraph {
        let config = Config::load(&self.root(), &Platform::detect()).expect("load config");
        CategoryGraph::new(config.categories).expect("build graph")
    }

    /// Resolve `requested` against `graph` and expand it under the fake home.
    pub fn plan<'g>(&self, graph: &'g CategoryGraph, requested: &[&str]) -> Vec<PlannedCategory<'g>> {
        let plan = graph.resolve(requested).expect("resolve");
        commands::expand_plan(&plan, &self.root().join("files"), &self.locations())
            .expect("expand plan")
    }

    /// Every entry under the fake home, relative and sorted.
    pub fn home_entries(&self) -> Vec<PathBuf> {
        let home = self.home();
        let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(&home)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .map(|e| e.path().strip_prefix(&home).expect("under home").to_path_buf())
            .collect();
        entries.sort();
        entries
    }

    /// The `dotfiles` binary, pointed at this repository and home.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("dotfiles");
        cmd.arg("--root")
            .arg(self.root())
            .arg("--home")
            .arg(self.home())
            .env("XDG_CACHE_HOME", self.cache())
            .env_remove("DOTFILES_ROOT");
        cmd
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin with an empty repository (no declaration) and an empty home.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = TestRepo { dir };
        std::fs::create_dir_all(repo.root().join("conf")).expect("create conf dir");
        std::fs::create_dir_all(repo.root().join("files")).expect("create files dir");
        std::fs::create_dir_all(repo.home()).expect("create home dir");
        Self { repo }
    }

    /// The standard declaration with every source file present.
    pub fn standard() -> Self {
        Self::new()
            .with_declaration(DECLARATION)
            .with_source("sh/inputrc", "set completion-ignore-case on\n")
            .with_source("sh/profile", "export EDITOR=vim\n")
            .with_source("bash/bashrc", "HISTSIZE=10000\n")
            .with_source("zsh/zshrc.local", "bindkey -e\n")
            .with_source("git/config", "[init]\n\tdefaultBranch = main\n")
            .with_source("vscode/User/settings.json", "{}\n")
            .with_source("vscode/User/keybindings.json", "[]\n")
    }

    /// Write `conf/categories.toml`.
    pub fn with_declaration(self, content: &str) -> Self {
        let path = self.repo.root().join("conf/categories.toml");
        std::fs::write(path, content).expect("write declaration");
        self
    }

    /// Create a source file under `files/`.
    pub fn with_source(self, relative: &str, content: &str) -> Self {
        write_file(&self.repo.source(relative), content);
        self
    }

    /// Create a file under the fake home directory.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        write_file(&self.repo.dest(relative), content);
        self
    }

    /// Finish building and return the repository.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// A [`Log`] implementation that keeps every message in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: RefCell<Vec<String>>,
    pub categories: RefCell<Vec<(String, CategoryStatus)>>,
}

impl Recorder {
    fn push(&self, kind: &str, msg: &str) {
        self.lines.borrow_mut().push(format!("{kind}: {msg}"));
    }

    /// Recorded status of `name`, if any.
    pub fn status(&self, name: &str) -> Option<CategoryStatus> {
        self.categories
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

impl Log for Recorder {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn patch(&self, text: &str) {
        self.push("patch", text);
    }
    fn record_category(&self, name: &str, status: CategoryStatus, _message: Option<&str>) {
        self.categories.borrow_mut().push((name.to_string(), status));
    }
}
