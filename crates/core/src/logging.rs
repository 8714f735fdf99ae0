//! Structured logging infrastructure with JSON output.
//!
//! This module provides logging functionality for Helm, including:
//! - JSON-structured logs written to non-blocking run files
//! - Filtering via the `HELM_LOG` environment variable
//! - Automatic log file cleanup based on a retention limit
//! - Unique run ID for correlating logs across a session
//!
//! # Architecture
//!
//! The logging system is built on the `tracing` crate ecosystem:
//! - `tracing_subscriber` for composable logging layers
//! - `tracing_appender` for non-blocking file I/O
//! - JSON formatting for structured, machine-readable logs
//! - `EnvFilter` for flexible log level control
//!
//! Each application run generates a unique Run ID (UUID v7) that appears in
//! the log filename (`helm-<run_id>.log`) and in the opening event, so all
//! entries of a session can be correlated.
//!
//! # Log File Management
//!
//! Files are named with the run ID: `helm-<run_id>.log`. Cleanup happens at
//! initialization: when more than [`MAX_RUN_LOGS`] run files exist, the
//! oldest are deleted first.
//!
//! # Filtering
//!
//! The filter defaults to `info` and can be overridden with `HELM_LOG`:
//!
//! ```bash
//! HELM_LOG=debug ./helm
//! HELM_LOG=helm_core::controller=trace,info ./helm
//! ```

use anyhow::{Context, Error};
use std::fs;
use std::fs::DirEntry;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const GIT_VERSION: &str = env!("GIT_VERSION");
const LOG_FILE_PREFIX: &str = "helm-";
const LOG_FILE_SUFFIX: &str = "log";
const LOG_FILTER_ENV: &str = "HELM_LOG";

/// Run files kept per log directory; older runs are pruned at startup.
pub const MAX_RUN_LOGS: usize = 5;

static LOG_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Returns the unique run ID for this application session.
///
/// The run ID is a UUID v7 generated at first access and remains constant
/// for the lifetime of the process. It names the log file and tags the
/// opening event of every run.
///
/// # Example
///
/// ```
/// use helm_core::logging::get_run_id;
///
/// let run_id = get_run_id();
/// assert_eq!(get_run_id(), run_id); // Consistent across calls
/// ```
pub fn get_run_id() -> &'static str {
    RUN_ID.get_or_init(|| Uuid::now_v7().to_string()).as_str()
}

/// Removes old run log files to maintain the retention limit.
///
/// Scans `log_dir` for files matching `helm-*.log` and deletes the oldest
/// when the count exceeds `max_files`.
///
/// Note: this relies on the run ID being a UUID v7 (time-ordered). Filenames
/// are `helm-<run_id>.log` where `<run_id>` is generated with
/// `Uuid::now_v7()`, so lexicographic sorting of the filenames corresponds
/// to chronological order. Sorting by file name therefore yields
/// oldest-first ordering for removal.
///
/// # Arguments
///
/// * `log_dir` - Path to the directory containing log files
/// * `max_files` - Maximum number of log files to retain (0 = keep all)
///
/// # Errors
///
/// Returns an error if the log directory cannot be read or old log files
/// cannot be deleted.
fn cleanup_run_logs(log_dir: &Path, max_files: usize) -> Result<(), Error> {
    if max_files == 0 {
        return Ok(());
    }

    let mut entries = collect_run_log_entries(log_dir)?;
    if entries.len() <= max_files {
        return Ok(());
    }

    entries.sort_by_key(|entry| entry.file_name());
    let remove_count = entries.len().saturating_sub(max_files);
    for entry in entries.into_iter().take(remove_count) {
        fs::remove_file(entry.path())
            .with_context(|| format!("can't remove old log file {}", entry.path().display()))?;
    }

    Ok(())
}

/// Collects all Helm run log entries from the specified directory.
///
/// Only files matching the pattern `helm-*.log` are collected.
fn collect_run_log_entries(log_dir: &Path) -> Result<Vec<DirEntry>, Error> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(log_dir)
        .with_context(|| format!("can't read log directory {}", log_dir.display()))?
    {
        let entry = entry.context("can't read log directory entry")?;
        if is_run_log_entry(&entry) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Determines whether a directory entry is a Helm run log file.
fn is_run_log_entry(entry: &DirEntry) -> bool {
    let file_name = entry.file_name();
    let file_name = file_name.to_string_lossy();
    if !file_name.starts_with(LOG_FILE_PREFIX) {
        return false;
    }

    file_name.ends_with(LOG_FILE_SUFFIX)
}

/// Initializes the logging system with JSON output to a run file.
///
/// This function sets up the complete logging infrastructure:
/// - Creates `log_dir` if it doesn't exist
/// - Cleans up old run files beyond the retention limit
/// - Configures a file appender with non-blocking I/O
/// - Applies filtering from `HELM_LOG` (default `info`)
/// - Records the run ID and build version in an opening event
///
/// Calling it again after a successful initialization is a no-op. The
/// logging system remains active until [`shutdown_logging`] is called.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - Log file cleanup fails
/// - The file appender cannot be initialized
/// - The log filter configuration is invalid
/// - The tracing subscriber cannot be installed
///
/// # Example
///
/// ```no_run
/// use helm_core::logging::{init_logging, shutdown_logging};
///
/// init_logging("logs".as_ref())?;
///
/// tracing::info!("application started");
///
/// // At application exit (flushes buffers)
/// shutdown_logging();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logging(log_dir: &Path) -> Result<(), Error> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    fs::create_dir_all(log_dir)
        .with_context(|| format!("can't create log directory {}", log_dir.display()))?;

    cleanup_run_logs(log_dir, MAX_RUN_LOGS)?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(format!("{}{}", LOG_FILE_PREFIX, get_run_id()))
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_RUN_LOGS)
        .build(log_dir)
        .context("can't initialize log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(Mutex::new(Some(guard)));

    let filter = build_filter()?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_current_span(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("can't initialize tracing subscriber")?;

    tracing::info!(
        run_id = get_run_id(),
        version = GIT_VERSION,
        "logging started"
    );

    Ok(())
}

/// Gracefully shuts down the logging system and flushes buffered data.
///
/// Dropping the worker guard flushes the file appender; the drop runs on a
/// watchdog thread so a wedged writer cannot stall process exit for more
/// than five seconds. Call once at application shutdown.
pub fn shutdown_logging() {
    if let Some(mutex) = LOG_GUARD.get() {
        if let Ok(mut guard_opt) = mutex.lock() {
            if let Some(guard) = guard_opt.take() {
                let (tx, rx) = mpsc::channel();

                thread::spawn(move || {
                    drop(guard);
                    let _ = tx.send(());
                });

                let _ = rx.recv_timeout(Duration::from_secs(5));
            }
        }
    }
}

/// Builds an `EnvFilter` from `HELM_LOG`, falling back to `info`.
fn build_filter() -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Ok(filter);
    }

    EnvFilter::builder()
        .parse("info")
        .context("invalid logging filter")
}
