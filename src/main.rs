//! `dotfiles` binary: parses the command line and dispatches to the installer.

use std::process::ExitCode;

use clap::Parser;

use dotfiles_installer::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        println!("dotfiles {}", commands::version());
        return ExitCode::SUCCESS;
    }

    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    let result = match &args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        cli::Command::Diff(opts) => commands::diff::run(&args.global, opts, &log),
        cli::Command::List => commands::list::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
