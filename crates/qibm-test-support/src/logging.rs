//! Per-suite logging setup.
//!
//! A suite gets its own [`Dispatch`] with up to three outputs:
//! - suite events (anything not emitted by the provider crates) go to
//!   `<source stem>.log` next to the test source
//! - suite events are echoed to the test output when `STREAM_LOG` is set
//! - provider crate events go to the test output only, at the library level
//!
//! Provider events never reach the suite file, so nothing is written twice.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::{DEFAULT_LEVEL, TestLogConfig, parse_level};
use crate::error::{SupportError, SupportResult};

/// Target prefixes of the provider library crates.
pub const LIBRARY_TARGETS: [&str; 3] = ["qibm_backend", "qibm_sched", "qibm_job"];

/// Whether `target` belongs to a provider library crate.
pub fn is_library_target(target: &str) -> bool {
    LIBRARY_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Log file path for a test source file: same path, `.log` extension.
pub fn log_file_for(source_file: &Path) -> PathBuf {
    resolve_source(source_file).with_extension("log")
}

/// Locate a `file!()` path, which is relative to the workspace root rather
/// than to the working directory of the test binary.
fn resolve_source(source_file: &Path) -> PathBuf {
    if source_file.is_absolute() || source_file.exists() {
        return source_file.to_path_buf();
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| {
            cwd.ancestors()
                .map(|dir| dir.join(source_file))
                .find(|candidate| candidate.exists())
        })
        .unwrap_or_else(|| source_file.to_path_buf())
}

/// Filter directives giving every library target `level`.
fn library_directives(level: &str) -> String {
    if level.contains('=') {
        return level.to_string();
    }
    LIBRARY_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn library_filter(directives: &str) -> SupportResult<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| SupportError::InvalidFilter {
        directives: directives.to_string(),
        message: e.to_string(),
    })
}

/// A configured suite logger.
#[derive(Debug, Clone)]
pub struct SuiteLogging {
    /// Dispatcher carrying all suite outputs.
    pub dispatch: Dispatch,
    /// Suite level in effect.
    pub level: LevelFilter,
    /// Log file being written, if any.
    pub log_file: Option<PathBuf>,
}

/// Build the suite logger for a test suite rooted at `source_file`.
///
/// Configuration problems never fail the suite: an invalid level falls back
/// to [`DEFAULT_LEVEL`], an invalid library level inherits the suite level,
/// and an unwritable log file disables file output. Each is reported as a
/// warning through the new dispatcher.
pub fn setup_test_logging(
    suite_name: &str,
    source_file: &Path,
    config: &TestLogConfig,
) -> SuiteLogging {
    let mut problems: Vec<SupportError> = Vec::new();

    let level = config.suite_level().unwrap_or_else(|e| {
        problems.push(e);
        DEFAULT_LEVEL
    });

    let inherited = library_directives(&level.to_string());
    let library = match config.library_level.as_deref() {
        Some(requested) => match parse_level(requested) {
            Ok(lib_level) => library_filter(&library_directives(&lib_level.to_string())),
            Err(_) => library_filter(&library_directives(requested)),
        },
        None => library_filter(&inherited),
    }
    .or_else(|e| {
        problems.push(e);
        library_filter(&inherited)
    })
    .unwrap_or_else(|_| EnvFilter::new("off"));

    let mut log_file = None;
    let file = if config.file_log {
        let path = log_file_for(source_file);
        match File::create(&path) {
            Ok(file) => {
                log_file = Some(path);
                Some(file)
            }
            Err(source) => {
                problems.push(SupportError::LogFile { path, source });
                None
            }
        }
    } else {
        None
    };

    let suite_filter =
        filter_fn(move |meta| !is_library_target(meta.target()) && *meta.level() <= level);

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_filter(suite_filter.clone())
    });
    let stream_layer = config.stream_log.then(|| {
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_filter(suite_filter.clone())
    });
    let library_layer = fmt::layer()
        .with_test_writer()
        .with_target(true)
        .with_filter(library);

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stream_layer)
        .with(library_layer);
    let dispatch = Dispatch::new(subscriber);

    tracing::dispatcher::with_default(&dispatch, || {
        for problem in &problems {
            tracing::warn!(suite = suite_name, "error while configuring test logging: {problem}");
        }
        tracing::debug!(suite = suite_name, level = %level, "test logging configured");
    });

    SuiteLogging {
        dispatch,
        level,
        log_file,
    }
}
