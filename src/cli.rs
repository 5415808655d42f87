use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotfiles installer.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Install dotfiles by category, as symlinks or copies",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override dotfiles root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Install into this directory instead of the real home directory
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install categories and everything they depend on
    Install(InstallOpts),
    /// Compare repository files with installed files
    Diff(DiffOpts),
    /// List declared categories
    List,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Diff(_) => "diff",
            Self::List => "list",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Copy files instead of symlinking them
    #[arg(long)]
    pub cp: bool,

    /// Categories to install (default: all)
    pub categories: Vec<String>,
}

/// Options for the `diff` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct DiffOpts {
    /// Categories to compare (default: all)
    pub categories: Vec<String>,
}
