//! Crash reports for panics
//!
//! A panic can interrupt an index rewrite, so the report always ends with a
//! reminder to look for `.bak` files before the next session.

use backtrace::Backtrace;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const BACKUP_HINT: &str =
    "If a .bak file remains in the tag directory, reconcile it with its index file and delete it before the next session.";

/// Everything written about one panic
#[derive(Debug, Clone)]
pub struct CrashReport {
    pub time: DateTime<Local>,
    pub thread: String,
    pub location: Option<String>,
    pub message: String,
    pub backtrace: Option<String>,
}

impl CrashReport {
    fn capture(info: &PanicHookInfo) -> Self {
        Self {
            time: Local::now(),
            thread: std::thread::current().name().unwrap_or("<unnamed>").to_string(),
            location: info.location().map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
            message: panic_message(info),
            backtrace: Some(format!("{:?}", Backtrace::new())),
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "imgtagger crashed at {}", self.time.to_rfc3339());
        let _ = writeln!(text, "thread: {}", self.thread);
        let _ = writeln!(text, "location: {}", self.location.as_deref().unwrap_or("<unknown>"));
        let _ = writeln!(text, "message: {}", self.message);
        let _ = writeln!(text);
        let _ = writeln!(text, "{}", BACKUP_HINT);
        if let Some(backtrace) = &self.backtrace {
            let _ = writeln!(text);
            let _ = writeln!(text, "backtrace:");
            let _ = writeln!(text, "{}", backtrace);
        }
        text
    }
}

/// `<dir>/crash_YYYYmmdd_HHMMSS.txt`
pub fn crash_report_path(dir: &Path, time: &DateTime<Local>) -> PathBuf {
    dir.join(format!("crash_{}.txt", time.format("%Y%m%d_%H%M%S")))
}

fn panic_message(info: &PanicHookInfo) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Install a hook that writes a crash report next to the logs
pub fn init_panic_hook(crash_dir: PathBuf) {
    std::panic::set_hook(Box::new(move |info| {
        let report = CrashReport::capture(info);
        let text = report.to_text();

        tracing::error!(
            thread = %report.thread,
            location = report.location.as_deref().unwrap_or("<unknown>"),
            "Panic: {}",
            report.message
        );
        eprintln!("{}", text);

        let path = crash_report_path(&crash_dir, &report.time);
        match std::fs::write(&path, &text) {
            Ok(()) => eprintln!("Crash report written to {}", path.display()),
            Err(e) => eprintln!("Failed to write crash report {}: {}", path.display(), e),
        }
    }));
    tracing::debug!("Panic hook initialized");
}
