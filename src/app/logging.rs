//! Usage: Process-wide tracing setup (stderr + daily rolling file) and log retention.

use std::path::Path;
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "zelo.log";
const DEFAULT_FILTER: &str = "info";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

static INIT: Once = Once::new();

/// Installs the global subscriber once; later calls are no-ops.
/// When the log dir is unusable only the stderr layer is installed.
pub fn init(log_dir: &Path, retention_days: u32) {
    INIT.call_once(|| install(log_dir, retention_days));
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, String> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .map_err(|e| format!("failed to open log file in {}: {e}", log_dir.display()))
}

fn install(log_dir: &Path, retention_days: u32) {
    let file_writer = match file_appender(log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("file logging disabled: {err}");
            None
        }
    };
    let file_enabled = file_writer.is_some();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if let Err(err) = tracing_log::LogTracer::init() {
        eprintln!("log bridge init skipped: {err}");
    }

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer);
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing init skipped: {err}");
        return;
    }

    if !file_enabled {
        tracing::warn!(dir = %log_dir.display(), "logging to stderr only");
        return;
    }

    match prune_old_logs(log_dir, retention_days, SystemTime::now()) {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "pruned old log files"),
        Err(err) => tracing::warn!("log pruning failed: {}", err),
    }
    tracing::info!(dir = %log_dir.display(), "logging initialized");
}

/// Removes `zelo.log.*` files last modified more than `retention_days` before `now`.
pub(crate) fn prune_old_logs(
    log_dir: &Path,
    retention_days: u32,
    now: SystemTime,
) -> Result<usize, String> {
    let max_age = Duration::from_secs(u64::from(retention_days.max(1)) * 24 * 60 * 60);
    let entries = std::fs::read_dir(log_dir)
        .map_err(|e| format!("failed to read log dir {}: {e}", log_dir.display()))?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let expired = now
            .duration_since(modified)
            .map(|age| age > max_age)
            .unwrap_or(false);
        if expired && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}
