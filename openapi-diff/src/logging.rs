// Copyright 2025 Oxide Computer Company

//! Logging configuration for tools built on this crate
//!
//! The comparison itself only ever logs through the `slog::Logger` handed to
//! [`crate::DiffEngine::new`].  These types exist so that a checker can
//! describe where that logger should write in its own TOML configuration.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Deserialize;
use serde::Serialize;
use slog::Drain;
use slog::Level;
use slog::Logger;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::LineWriter;
use std::io::Write;

/// Where a checker's log records go, and the least severe level kept
///
/// In TOML this is a table with a `mode` key, for example
/// `{ mode = "stderr-terminal", level = "info" }`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum ConfigLogging {
    /// human-readable records on stderr
    StderrTerminal { level: ConfigLoggingLevel },
    /// one bunyan JSON record per line in `path`
    File {
        level: ConfigLoggingLevel,
        path: Utf8PathBuf,
        if_exists: ConfigLoggingIfExists,
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLoggingLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl From<&ConfigLoggingLevel> for Level {
    fn from(level: &ConfigLoggingLevel) -> Level {
        match level {
            ConfigLoggingLevel::Trace => Level::Trace,
            ConfigLoggingLevel::Debug => Level::Debug,
            ConfigLoggingLevel::Info => Level::Info,
            ConfigLoggingLevel::Warn => Level::Warning,
            ConfigLoggingLevel::Error => Level::Error,
            ConfigLoggingLevel::Critical => Level::Critical,
        }
    }
}

/// Handling of a log file left behind by an earlier run
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLoggingIfExists {
    Fail,
    Truncate,
    Append,
}

impl ConfigLoggingIfExists {
    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        match self {
            ConfigLoggingIfExists::Fail => options.create_new(true),
            ConfigLoggingIfExists::Truncate => options.truncate(true),
            ConfigLoggingIfExists::Append => options.append(true),
        };
        options
    }
}

impl ConfigLogging {
    /// Builds the root logger to pass to [`crate::DiffEngine::new`]
    ///
    /// `log_name` becomes the `name` of every bunyan record.  Records are
    /// written from a background thread; they are flushed when the last
    /// clone of the returned logger is dropped.
    pub fn to_logger(&self, log_name: &'static str) -> io::Result<Logger> {
        match self {
            ConfigLogging::StderrTerminal { level } => {
                let decorator = slog_term::TermDecorator::new().build();
                let drain =
                    slog_term::FullFormat::new(decorator).build().fuse();
                Ok(root_logger(level, drain))
            }
            ConfigLogging::File { level, path, if_exists } => {
                let file = open_log_file(&if_exists.open_options(), path)?;
                let drain =
                    slog_bunyan::with_name(log_name, file).build().fuse();
                let log = root_logger(level, drain);

                // Tell whoever is watching the terminal where to look.
                if let Err(error) =
                    writeln!(io::stderr(), "note: logging to \"{}\"", path)
                {
                    warn!(log, "could not print log file path";
                        "error" => %error,
                    );
                }
                Ok(log)
            }
        }
    }
}

fn root_logger<D>(level: &ConfigLoggingLevel, drain: D) -> Logger
where
    D: Drain + Send + 'static,
    D::Err: std::fmt::Debug,
{
    let filtered = slog::LevelFilter(drain, Level::from(level)).fuse();
    let drain = slog_async::Async::new(filtered).chan_size(1024).build();
    Logger::root(drain.fuse(), o!())
}

/// Opens `path` for logging, creating its directory if needed
fn open_log_file(
    options: &OpenOptions,
    path: &Utf8Path,
) -> io::Result<LineWriter<File>> {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => {
            fs::create_dir_all(parent)?
        }
        _ => (),
    }
    Ok(LineWriter::new(options.open(path)?))
}
