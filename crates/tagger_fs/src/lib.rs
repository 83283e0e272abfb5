//! imgtagger file system layer
//!
//! Provides:
//! - Line-oriented text files (catalog lists, subsets, tag indexes, positions)
//! - Backup-then-overwrite rewrites with stale backup detection
//! - Natural-order image directory listing

mod browser;
mod file_operations;
mod lines;

pub use browser::{list_images, natural_cmp, ListOptions};
pub use file_operations::{backup_path, find_backups, rewrite_with_backup, BACKUP_SUFFIX};
pub use lines::{append_line, parse_id_lines, read_id_lines, read_lines, write_lines};

use std::path::PathBuf;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("{path}:{line}: expected an integer, found {found:?}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, FsError>;
