//! Tracing subscriber: console formatter and per-command log file.
//!
//! [`Logger`](super::Logger) tags events with the targets below. Both layers
//! classify an event into a [`Kind`] and render it from there, so console and
//! file output never disagree about what an event is.
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target of stage headers.
pub(super) const STAGE: &str = "dotfiles::stage";
/// Target of actions a dry run reports instead of performing.
pub(super) const DRY_RUN: &str = "dotfiles::dry_run";
/// Target of unified diff text from `diff`.
pub(super) const PATCH: &str = "dotfiles::patch";

/// How an event is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Error,
    Warn,
    Stage,
    DryRun,
    Patch,
    Info,
    Debug,
}

impl Kind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE) => Self::Stage,
            (Level::INFO, DRY_RUN) => Self::DryRun,
            (Level::INFO, PATCH) => Self::Patch,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// The `message` field of an event.
fn message(event: &tracing::Event<'_>) -> String {
    #[derive(Default)]
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                self.0 = value.to_string();
            }
        }
    }

    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// Console rendering of one event, ending in a newline.
fn console_text(kind: Kind, msg: &str) -> String {
    match kind {
        Kind::Error => format!("\x1b[31mERROR\x1b[0m {msg}\n"),
        Kind::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}\n"),
        Kind::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m\n"),
        Kind::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}\n"),
        Kind::Info => format!("  {msg}\n"),
        Kind::Debug => format!("  \x1b[2m{msg}\x1b[0m\n"),
        Kind::Patch => msg.lines().fold(String::new(), |mut out, line| {
            let color = if line.starts_with("---") || line.starts_with("+++") {
                "\x1b[1m"
            } else if line.starts_with("@@") {
                "\x1b[36m"
            } else if line.starts_with('-') {
                "\x1b[31m"
            } else if line.starts_with('+') {
                "\x1b[32m"
            } else {
                ""
            };
            writeln!(out, "    {color}{line}\x1b[0m").ok();
            out
        }),
    }
}

/// Log file rendering of one event: timestamped, ANSI stripped, one entry
/// per line of the message.
fn file_text(kind: Kind, ts: &str, msg: &str) -> String {
    let msg = strip_ansi(msg);
    let tag = match kind {
        Kind::Stage => "==> ",
        Kind::DryRun => "    [dry run] ",
        Kind::Error => "    [error] ",
        Kind::Warn => "    [warn] ",
        Kind::Debug => "    [debug] ",
        Kind::Patch => "    | ",
        Kind::Info => "    ",
    };
    msg.lines().fold(String::new(), |mut out, line| {
        writeln!(out, "[{ts}] {tag}{line}").ok();
        out
    })
}

/// A [`tracing_subscriber::Layer`] that appends every event to the log file
/// of the running command.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open `$XDG_CACHE_HOME/dotfiles/<command>.log`.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened; logging then goes to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?, command)
    }

    /// Truncate `path`, write a header naming `command`, and append to it.
    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("DOTFILES_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# dotfiles {version} {command}\n# started {} UTC\n",
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let text = file_text(Kind::of(event.metadata()), &format_utc_time(), &message(event));
        if let Ok(mut f) = self.file.lock() {
            f.write_all(text.as_bytes()).ok();
        }
    }
}

/// Console formatter for [`Kind`]-classified events.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        writer.write_str(&console_text(Kind::of(event.metadata()), &message(event)))
    }
}

/// Initialise the global [`tracing`] subscriber for `command`.
///
/// Warnings and errors go to stderr, everything else to stdout. Debug events
/// reach the console only when `verbose` is set but always reach the log
/// file. Must be called once, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_header_names_command() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("diff.log");
        let _layer = FileLayer::at(&path, "diff").expect("layer");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# dotfiles "));
        assert!(contents.lines().next().unwrap().ends_with(" diff"));
    }

    #[test]
    fn file_layer_none_for_unwritable_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing-dir").join("install.log");
        assert!(FileLayer::at(&path, "install").is_none());
    }

    #[test]
    fn file_text_tags_each_line() {
        assert_eq!(
            file_text(Kind::Stage, "12:00:00", "\x1b[1mzsh\x1b[0m"),
            "[12:00:00] ==> zsh\n"
        );
        assert_eq!(
            file_text(Kind::Patch, "12:00:00", "@@ -1 +1 @@\n-a\n+b\n"),
            "[12:00:00]     | @@ -1 +1 @@\n[12:00:00]     | -a\n[12:00:00]     | +b\n"
        );
    }

    #[test]
    fn console_text_colors_patch_lines() {
        let text = console_text(Kind::Patch, "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "    \x1b[31m-x\x1b[0m");
        assert_eq!(lines[4], "    \x1b[32m+y\x1b[0m");
        assert_eq!(strip_ansi(lines[0]), "    --- a");
    }

    #[test]
    fn console_text_plain_info_is_indented() {
        assert_eq!(console_text(Kind::Info, "differs: ~/.profile"), "  differs: ~/.profile\n");
    }
}
