//! Backup-then-overwrite rewrites
//!
//! A rewrite copies the current file to `<name>.bak`, writes the new
//! contents, then removes the backup. A crash in between leaves the backup
//! behind, which callers treat as an unresolved previous session.

use crate::{FsError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to a file name to form its backup
pub const BACKUP_SUFFIX: &str = ".bak";

/// Backup path for `path`: same directory, same name plus [`BACKUP_SUFFIX`]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Rewrite `path` with one item per line, guarded by a temporary backup
pub fn rewrite_with_backup<I, T>(path: &Path, items: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let backup = backup_path(path);

    if path.exists() {
        fs::copy(path, &backup)?;
    }

    crate::write_lines(path, items)?;

    if backup.exists() {
        fs::remove_file(&backup)?;
    }

    tracing::trace!("Rewrote {:?}", path);
    Ok(())
}

/// List leftover backup files directly inside `dir`, sorted by name
pub fn find_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(FsError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(FsError::NotADirectory(dir.to_path_buf()));
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_backup = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(BACKUP_SUFFIX));
        if is_backup && path.is_file() {
            backups.push(path);
        }
    }

    backups.sort();
    Ok(backups)
}
