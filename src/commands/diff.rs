//! Command: compare repository files with what is installed.
use anyhow::Result;

use super::{CommandSetup, PlannedCategory};
use crate::cli::{DiffOpts, GlobalOpts};
use crate::logging::{Log, Logger};
use crate::resources::compare::{self, DiffStatus, FileDiff};

/// Run the diff command.
///
/// Differences are reported, not treated as errors.
///
/// # Errors
///
/// Returns an error only if configuration or resolution fails.
pub fn run(global: &GlobalOpts, opts: &DiffOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let planned = setup.plan(&opts.categories, log)?;

    let diffs = diff_plan(&planned, log);

    let count = |status: DiffStatus| diffs.iter().filter(|d| d.status == status).count();
    println!();
    log.info(&format!(
        "{} files: {} identical, {} differ, {} missing at destination, {} missing in source",
        diffs.len(),
        count(DiffStatus::Identical),
        count(DiffStatus::Differs),
        count(DiffStatus::MissingAtDestination),
        count(DiffStatus::MissingInSource),
    ));
    Ok(())
}

/// Compare every target of `planned` without touching the filesystem.
///
/// Every file that is not identical is followed by a zero-context unified
/// diff from the repository copy to the installed one. Files that cannot be
/// read are logged as warnings and left out of the result; their siblings
/// are still compared.
pub fn diff_plan(planned: &[PlannedCategory<'_>], log: &dyn Log) -> Vec<FileDiff> {
    let mut diffs = Vec::new();

    for entry in planned {
        if !entry.category.is_applicable() {
            log.debug(&format!(
                "{}: no files for this platform",
                entry.category.name
            ));
            continue;
        }
        log.stage(&entry.category.name);

        for target in &entry.targets {
            let found = compare::compare_mapping(&target.source, &target.destination);
            for failure in &found.failures {
                log.warn(&failure.to_string());
            }
            for diff in found.files {
                report(&diff, log);
                diffs.push(diff);
            }
        }
    }

    diffs
}

fn report(diff: &FileDiff, log: &dyn Log) {
    let destination = diff.destination.display();
    match diff.status {
        DiffStatus::Identical => {
            log.debug(&format!("identical: {destination}"));
            return;
        }
        DiffStatus::Differs => log.info(&format!("differs: {destination}")),
        DiffStatus::MissingAtDestination => log.info(&format!("missing: {destination}")),
        DiffStatus::MissingInSource => {
            log.info(&format!("not in repository: {destination}"));
        }
    }

    match compare::unified_diff(&diff.source, &diff.destination) {
        Ok(patch) if !patch.is_empty() => log.patch(&patch),
        Ok(_) => {}
        Err(e) => log.warn(&format!("cannot diff {destination}: {e}")),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::Target;
    use crate::config::categories::{Category, FileMapping};
    use crate::logging::isolated_logger;
    use std::path::PathBuf;

    #[test]
    fn diff_plan_reports_each_file_without_writing() {
        let (log, tmp, _guard) = isolated_logger();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("files/sh")).unwrap();
        std::fs::create_dir_all(root.join("home")).unwrap();
        std::fs::write(root.join("files/sh/profile"), "a\n").unwrap();
        std::fs::write(root.join("files/sh/inputrc"), "b\n").unwrap();
        std::fs::write(root.join("home/.profile"), "changed\n").unwrap();

        let sh = Category {
            name: "sh".into(),
            depends: vec![],
            files: vec![
                FileMapping {
                    source: PathBuf::from("sh/profile"),
                    target: Some("~/.profile".into()),
                },
                FileMapping {
                    source: PathBuf::from("sh/inputrc"),
                    target: Some("~/.inputrc".into()),
                },
            ],
        };
        let planned = [PlannedCategory {
            category: &sh,
            targets: vec![
                Target {
                    source: root.join("files/sh/profile"),
                    destination: root.join("home/.profile"),
                },
                Target {
                    source: root.join("files/sh/inputrc"),
                    destination: root.join("home/.inputrc"),
                },
            ],
        }];

        let diffs = diff_plan(&planned, &log);
        let statuses: Vec<_> = diffs.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            [DiffStatus::Differs, DiffStatus::MissingAtDestination]
        );
        assert!(!root.join("home/.inputrc").exists());
        assert_eq!(
            std::fs::read_to_string(root.join("home/.profile")).unwrap(),
            "changed\n"
        );
    }

    #[test]
    fn diff_plan_keeps_going_past_unreadable_file() {
        let (log, tmp, _guard) = isolated_logger();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("files/vscode")).unwrap();
        std::fs::create_dir_all(root.join("home/settings.json")).unwrap();
        std::fs::write(root.join("files/vscode/settings.json"), "{}\n").unwrap();
        std::fs::write(root.join("files/vscode/keybindings.json"), "[]\n").unwrap();
        std::fs::write(root.join("home/keybindings.json"), "[1]\n").unwrap();

        let vscode = Category {
            name: "vscode".into(),
            depends: vec![],
            files: vec![FileMapping {
                source: PathBuf::from("vscode"),
                target: Some("~".into()),
            }],
        };
        let planned = [PlannedCategory {
            category: &vscode,
            targets: vec![Target {
                source: root.join("files/vscode"),
                destination: root.join("home"),
            }],
        }];

        let diffs = diff_plan(&planned, &log);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].destination, root.join("home/keybindings.json"));
        assert_eq!(diffs[0].status, DiffStatus::Differs);

        let contents = std::fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[warn] compare"), "{contents}");
        assert!(contents.contains("| -[]"), "{contents}");
        assert!(contents.contains("| +[1]"), "{contents}");
    }
}
