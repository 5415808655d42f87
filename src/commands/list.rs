//! Command: list declared categories.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::categories::Category;
use crate::logging::Logger;
use crate::platform::Os;

/// Print every category in declaration order.
///
/// # Errors
///
/// Returns an error if the declaration cannot be loaded.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    log.stage("Categories");
    for category in setup.graph.categories() {
        log.info(&describe(category, setup.platform.os));
    }
    Ok(())
}

/// One line per category: name, file count, dependencies, applicability.
fn describe(category: &Category, os: Os) -> String {
    let active = category.files.iter().filter(|f| f.target.is_some()).count();
    let mut line = format!("{} ({active} files)", category.name);
    if !category.depends.is_empty() {
        line.push_str(&format!(" <- {}", category.depends.join(", ")));
    }
    if !category.is_applicable() {
        line.push_str(&format!(" [n/a on {os}]"));
    }
    line
}
