//! Tracing configuration and log routing.
//!
//! The HTTP server and CLI write compact logs to stdout and append the same events to a file
//! (`PDF_DIGEST_LOG_FILE`, or `logs/pdf-digest.log`). The MCP binary only writes the file, since its
//! stdout is the protocol stream.
use std::{path::PathBuf, sync::OnceLock};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Uses a global guard to keep the non‑blocking writer alive for the process lifetime.
/// - Calling it more than once is harmless; later calls are ignored.
pub fn init_tracing() {
    install(true);
}

/// Configure tracing with the file layer only (for stdio transports).
pub fn init_file_tracing() {
    install(false);
}

fn install(with_stdout: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = with_stdout.then(|| fmt::layer().with_target(false).compact());
    let file_layer = configure_file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}

const LOG_FILE_VAR: &str = "PDF_DIGEST_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/pdf-digest.log";

/// Where file logs go: `PDF_DIGEST_LOG_FILE` when set and non-blank, else the default path.
fn log_file_path() -> PathBuf {
    std::env::var(LOG_FILE_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Open the log file in append mode behind a non-blocking writer.
///
/// Logging setup never aborts the process: on failure the problem is printed to stderr and the
/// file layer is skipped.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
