// Copyright 2025 Oxide Computer Company

//! Automated testing facilities.  These are intended for use both by this
//! crate and by consumers writing checks on top of it.

use crate::document::SpecDocument;
use crate::logging::ConfigLogging;
use camino::Utf8PathBuf;
use serde::de::DeserializeOwned;
use slog::Logger;
use std::fmt::Debug;
use std::fs;

/// Parses `contents` as TOML into a `T`, reporting the result on stderr under
/// `label` so that a failing test shows what was parsed
pub fn read_config<T: DeserializeOwned + Debug>(
    label: &str,
    contents: &str,
) -> Result<T, toml::de::Error> {
    let result = toml::from_str(contents);
    eprintln!("config \"{}\": {:?}", label, result);
    result
}

/// Builds a [`SpecDocument`] from a JSON value, panicking if it is not a
/// valid document
///
/// ```
/// use openapi_diff::test_util::document;
/// use serde_json::json;
///
/// let doc = document("base.json", json!({
///     "openapi": "3.0.3",
///     "info": { "title": "pets", "version": "1.0.0" },
///     "paths": {}
/// }));
/// assert_eq!(doc.source().as_str(), "base.json");
/// ```
pub fn document(source: &str, value: serde_json::Value) -> SpecDocument {
    let openapi = serde_json::from_value(value).unwrap_or_else(|error| {
        panic!("{}: not an OpenAPI document: {}", source, error)
    });
    SpecDocument::new(source, openapi)
        .unwrap_or_else(|error| panic!("{}: {}", source, error))
}

/// A logger for one test
///
/// If the logging configuration is file-based, the requested path _must_ be
/// the string `"UNUSED"`; it is replaced with a file in the temporary
/// directory whose name includes `test_name` and the process id.  That file
/// is removed by [`LogContext::cleanup_successful`], which a test should call
/// as one of its last steps.  It is not removed on drop, so the log of a
/// failed test stays around for debugging.
///
/// ```
/// # use openapi_diff::ConfigLoggingLevel;
/// use openapi_diff::ConfigLogging;
/// use openapi_diff::test_util::LogContext;
///
/// #[macro_use]
/// extern crate slog; /* for the `info!` macro below */
///
/// # fn main() {
/// let log_config = ConfigLogging::StderrTerminal {
///     level: ConfigLoggingLevel::Info,
/// };
/// let logctx = LogContext::new("my_test", &log_config);
/// info!(logctx.log, "the test is going great");
/// logctx.cleanup_successful();
/// # }
/// ```
pub struct LogContext {
    pub log: Logger,
    log_path: Option<Utf8PathBuf>,
}

impl LogContext {
    pub fn new(
        test_name: &'static str,
        initial_config_logging: &ConfigLogging,
    ) -> LogContext {
        let (log_path, log_config) = match initial_config_logging {
            ConfigLogging::File { level, path: dummy_path, if_exists } => {
                assert_eq!(
                    dummy_path.as_str(),
                    "UNUSED",
                    "for test suite logging configuration, when mode = \
                     \"file\" is used, the path MUST be the sentinel string \
                     \"UNUSED\".  It will be replaced with a unique path for \
                     each test."
                );
                let new_path = log_file_for_test(test_name);
                eprintln!("log file: {}", new_path);
                (
                    Some(new_path.clone()),
                    ConfigLogging::File {
                        level: level.clone(),
                        path: new_path,
                        if_exists: if_exists.clone(),
                    },
                )
            }
            other_config => (None, other_config.clone()),
        };

        let log = log_config.to_logger(test_name).unwrap_or_else(|error| {
            panic!("creating logger for test {:?}: {}", test_name, error)
        });
        LogContext { log, log_path }
    }

    /// Removes the log file, if this was a file-based logger.
    pub fn cleanup_successful(self) {
        let LogContext { log, log_path } = self;
        // Flush outstanding records before the file goes away.
        drop(log);
        if let Some(log_path) = log_path {
            fs::remove_file(&log_path).unwrap_or_else(|error| {
                panic!("removing log file {}: {}", log_path, error)
            });
        }
    }
}

fn log_file_for_test(test_name: &str) -> Utf8PathBuf {
    let arg0 = std::env::args()
        .next()
        .and_then(|arg0| {
            std::path::Path::new(&arg0)
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| String::from("openapi-diff"));
    let mut path = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap_or_else(|path| {
            panic!("temporary directory {:?} is not UTF-8", path)
        });
    path.push(format!("{}.{}.{}.log", arg0, test_name, std::process::id()));
    path
}
