//! Image directory listing in natural order

use crate::{FsError, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for listing image files
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub show_hidden: bool,
    /// Extension to match, without the dot; compared case-insensitively
    pub extension: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            extension: "jpg".into(),
        }
    }
}

impl ListOptions {
    pub fn with_extension(ext: &str) -> Self {
        Self {
            extension: ext.trim_start_matches('.').to_lowercase(),
            ..Default::default()
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };

        if !self.show_hidden && name.as_encoded_bytes().starts_with(b".") {
            return false;
        }

        path.extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

/// List regular files in `dir` matching `options`, sorted by natural file-name order
pub fn list_images<P: AsRef<Path>>(dir: P, options: &ListOptions) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Err(FsError::NotFound(dir.to_path_buf()));
    }

    if !dir.is_dir() {
        return Err(FsError::NotADirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || !options.matches(&path) {
            continue;
        }

        // Listings are stored as UTF-8 text; such a path could not be read back
        if path.to_str().is_none() {
            tracing::warn!("Skipping {:?}: path is not valid UTF-8", path);
            continue;
        }

        images.push(path);
    }

    images.sort_by(|a, b| {
        let a_name = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let b_name = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a_name, &b_name)
    });

    tracing::debug!("Listed {} images in {:?}", images.len(), dir);
    Ok(images)
}

/// Compare two names the way people expect: "image2.jpg" < "image10.jpg"
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_sort_key(a)
        .cmp(&natural_sort_key(b))
        .then_with(|| a.cmp(b))
}

fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                parts.push(NaturalSortPart::num(&current_num));
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        parts.push(NaturalSortPart::num(&current_num));
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

impl NaturalSortPart {
    // Digit runs too long for u64 fall back to text comparison.
    fn num(digits: &str) -> Self {
        digits
            .parse::<u64>()
            .map(NaturalSortPart::Num)
            .unwrap_or_else(|_| NaturalSortPart::Str(digits.to_string()))
    }
}
