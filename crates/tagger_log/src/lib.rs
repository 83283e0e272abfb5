//! imgtagger logging module
//!
//! Structured logging to a rolling file plus a crash-report panic hook.

mod panic_hook;
mod logging;

pub use panic_hook::{crash_report_path, init_panic_hook, CrashReport};
pub use logging::{init_logging, cleanup_old_logs, LogGuard};

use std::path::{Path, PathBuf};
use directories::ProjectDirs;

/// Default log directory when the configuration does not name one
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("org", "imgtagger", "imgtagger")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize logging and the panic hook.
///
/// Crash reports land in `log_dir` beside the logs. The returned guard
/// flushes the file writer when dropped; keep it alive for the whole session.
pub fn init(log_dir: &Path) -> anyhow::Result<LogGuard> {
    let guard = init_logging(log_dir)?;
    init_panic_hook(log_dir.to_path_buf());
    Ok(guard)
}
