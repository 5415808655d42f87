use anyhow::Result;

use super::{CommandSetup, PlannedCategory};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::error::InstallFailure;
use crate::logging::{CategoryStatus, Log, Logger};
use crate::resources::placement::{self, Action, Mode, Placement};

/// Outcome of installing a plan.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Every file that was (or in a dry run, would be) placed, in order.
    pub placed: Vec<(Placement, Action)>,
    /// Every file that could not be placed.
    pub failures: Vec<InstallFailure>,
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration or resolution fails, or if any file
/// could not be placed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    log.info(&format!("dotfiles {}", super::version()));
    let setup = CommandSetup::init(global, log)?;
    let planned = setup.plan(&opts.categories, log)?;

    let mode = if opts.cp { Mode::Copy } else { Mode::Symlink };
    if opts.dry_run {
        log.info(&format!("dry run: nothing will be written ({mode} mode)"));
    }

    let report = install_plan(&planned, mode, opts.dry_run, log);

    log.print_summary();

    let count = report.failures.len();
    if count > 0 {
        anyhow::bail!("{count} file(s) could not be installed");
    }
    Ok(())
}

/// Place every target of `planned`, in order.
///
/// A failure affects only its own file: it is logged, collected, and the
/// remaining files are still attempted. Each category's result is recorded
/// on `log` for the summary.
pub fn install_plan(
    planned: &[PlannedCategory<'_>],
    mode: Mode,
    dry_run: bool,
    log: &dyn Log,
) -> InstallReport {
    let mut report = InstallReport::default();

    for entry in planned {
        let name = entry.category.name.as_str();
        if !entry.category.is_applicable() {
            log.debug(&format!("{name}: no files for this platform"));
            log.record_category(name, CategoryStatus::NotApplicable, None);
            continue;
        }

        log.stage(name);
        let before = report.failures.len();
        let mut count = 0usize;

        for target in &entry.targets {
            let placements =
                match placement::expand_source(&target.source, &target.destination, mode) {
                    Ok(placements) => placements,
                    Err(failure) => {
                        log.error(&failure.to_string());
                        report.failures.push(failure);
                        continue;
                    }
                };

            for item in placements {
                match placement::place(&item, !dry_run) {
                    Ok(action) => {
                        if dry_run {
                            log.dry_run(&format!("would {action}: {item}"));
                        } else {
                            log.info(&format!("{action}: {item}"));
                        }
                        count += 1;
                        report.placed.push((item, action));
                    }
                    Err(failure) => {
                        log.error(&failure.to_string());
                        report.failures.push(failure);
                    }
                }
            }
        }

        let failed = report.failures.len() - before;
        if failed > 0 {
            log.record_category(
                name,
                CategoryStatus::Failed,
                Some(&format!("{failed} failed, {count} placed")),
            );
        } else if dry_run {
            log.record_category(
                name,
                CategoryStatus::DryRun,
                Some(&format!("{count} would be placed")),
            );
        } else {
            log.record_category(name, CategoryStatus::Ok, Some(&format!("{count} placed")));
        }
    }

    report
}
