//! Application error types

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum TaggerError {
    // ===== Interactive Errors (report as status text, continue) =====
    #[error("No such tag: {0}")]
    UnknownTag(u32),

    #[error("No such tag label: {0}")]
    UnknownLabel(String),

    #[error("Image {requested} is out of range (1..={max})")]
    OutOfRange { requested: u32, max: u32 },

    #[error("Key {0:?} is not bound to any tag")]
    UnboundKey(char),

    #[error("Key {0:?} is bound to several tags; not supported in grid mode")]
    AmbiguousKey(char),

    #[error("No active tag selected")]
    NoActiveTag,

    #[error("No thumbnail cell {0} on this page")]
    NoSuchCell(usize),

    #[error("Command not available in {0} mode")]
    WrongMode(&'static str),

    // ===== Fatal Errors (startup aborts) =====
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Line {line}: unknown directive {directive:?}")]
    UnknownDirective { line: usize, directive: String },

    #[error("Line {line}: directive {directive} has no value")]
    MissingValue { line: usize, directive: String },

    #[error("Line {line}: ${name} is not set")]
    UndefinedVariable { line: usize, name: String },

    #[error("Required directive {0} is not set")]
    MissingDirective(&'static str),

    #[error("Directive {directive} has invalid value {value:?}")]
    InvalidValue { directive: &'static str, value: String },

    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("No images found")]
    EmptyCatalog,

    #[error("Subset selects no images")]
    EmptySubset,

    #[error("Thumbnail missing: {0} (run imgtagger-thumbs first)")]
    MissingThumbnails(PathBuf),

    #[error("Subset file not found: {0}")]
    MissingSubsetFile(PathBuf),

    #[error("Subset entry {id} is outside the catalog (1..={max})")]
    InvalidSubsetEntry { id: u32, max: usize },

    #[error("Tag definition file not found: {0}")]
    TagFileMissing(PathBuf),

    #[error("Tag file line {line}: {reason}")]
    MalformedTagLine { line: usize, reason: String },

    #[error("Tag file line {line}: key {key:?} is reserved for a command")]
    ReservedKeyConflict { line: usize, key: char },

    #[error("Tag file line {line}: digit key {key:?} is reserved for tag shortcuts")]
    DigitKeyNotAllowed { line: usize, key: char },

    #[error("Tag file line {line}: auto-advance marker must follow a key")]
    MarkerWithoutKey { line: usize },

    #[error("Tag file line {line}: duplicate tag id {id}")]
    DuplicateTagId { line: usize, id: u32 },

    #[error("Tag file line {line}: duplicate tag label {label:?}")]
    DuplicateLabel { line: usize, label: String },

    #[error("Stale backup {0} found; an earlier session was interrupted mid-write. Reconcile it by hand and remove it")]
    StaleBackupPresent(PathBuf),

    #[error("File error: {0}")]
    Fs(#[from] tagger_fs::FsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl TaggerError {
    /// Is this error recoverable within an interactive session?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TaggerError::UnknownTag(_)
                | TaggerError::UnknownLabel(_)
                | TaggerError::OutOfRange { .. }
                | TaggerError::UnboundKey(_)
                | TaggerError::AmbiguousKey(_)
                | TaggerError::NoActiveTag
                | TaggerError::NoSuchCell(_)
                | TaggerError::WrongMode(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a short message suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            TaggerError::OutOfRange { requested, max } => {
                format!("No image {} (valid: 1-{})", requested, max)
            }
            TaggerError::UnboundKey(key) => format!("Unrecognized key: {}", key),
            TaggerError::NoActiveTag => "Select an active tag first".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tiers() {
        assert!(TaggerError::UnknownTag(4).is_recoverable());
        assert!(TaggerError::OutOfRange { requested: 9, max: 3 }.is_recoverable());
        assert!(TaggerError::EmptyCatalog.is_fatal());
        assert!(TaggerError::StaleBackupPresent(PathBuf::from("cat.txt.bak")).is_fatal());
    }

    #[test]
    fn test_user_message() {
        let err = TaggerError::OutOfRange { requested: 12, max: 10 };
        assert_eq!(err.user_message(), "No image 12 (valid: 1-10)");
    }
}
