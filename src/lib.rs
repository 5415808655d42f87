//! Dotfiles installer.
//!
//! Installs configuration files from a repository into the user's home
//! directory, grouped into named categories that may depend on each other.
//! Files are symlinked (or copied) to destinations written with location
//! tokens (`~`, `$HOME`, `$CONFIG`), so one declaration serves every platform.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load the category declaration and expand location tokens
//! - **[`plan`]**: the category graph and dependency-ordered resolution
//! - **[`resources`]**: file placement and content comparison
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `diff`, `list`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod platform;
pub mod resources;

mod plan_proptest;
