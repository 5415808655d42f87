#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Checks on the declaration shipped in `conf/categories.toml`.

use std::path::{Path, PathBuf};

use dotfiles_installer::config::Config;
use dotfiles_installer::config::locations::Locations;
use dotfiles_installer::plan::CategoryGraph;
use dotfiles_installer::platform::{Os, Platform};

const ALL: [Os; 3] = [Os::Linux, Os::MacOs, Os::Windows];

fn root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn home() -> PathBuf {
    root().join("target").join("home")
}

/// Every active destination of `category` on `os`, expanded under [`home`].
fn destinations(os: Os, category: &str) -> Vec<PathBuf> {
    let platform = Platform::new(os);
    let config = Config::load(root(), &platform).unwrap();
    let locations = Locations::under(&home(), &platform);
    config
        .categories
        .iter()
        .find(|c| c.name == category)
        .unwrap()
        .files
        .iter()
        .filter_map(|f| f.target.as_deref())
        .map(|t| locations.expand(t).unwrap())
        .collect()
}

#[test]
fn resolves_on_every_platform() {
    for os in ALL {
        let config = Config::load(root(), &Platform::new(os)).unwrap();
        let graph = CategoryGraph::new(config.categories).unwrap();
        let none: &[&str] = &[];
        assert!(!graph.resolve(none).unwrap().is_empty());
    }
}

#[test]
fn every_source_exists() {
    let config = Config::load(root(), &Platform::new(Os::Linux)).unwrap();
    for category in &config.categories {
        for file in &category.files {
            let source = config.files_dir().join(&file.source);
            assert!(source.is_file(), "{}: {}", category.name, source.display());
        }
    }
}

#[test]
fn git_config_goes_where_git_reads_it() {
    for os in ALL {
        assert_eq!(
            destinations(os, "git"),
            [home().join(".gitconfig")]
        );
    }
}

#[test]
fn zsh_installs_its_entry_point() {
    let home = home();
    assert_eq!(
        destinations(Os::Linux, "zsh"),
        [
            home.join(".zshrc.pre"),
            home.join(".zshrc"),
            home.join(".zshrc.local"),
        ]
    );
    assert!(destinations(Os::Windows, "zsh").is_empty());
}

#[test]
fn vscode_maps_only_managed_files() {
    let names: Vec<String> = destinations(Os::Linux, "vscode")
        .iter()
        .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["settings.json", "keybindings.json"]);
}
