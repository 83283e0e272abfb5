//! Navigation state within the session subset

use crate::{Config, Result, TaggerError};
use std::path::{Path, PathBuf};

/// Result of a relative move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    AtFirst,
    AtLast,
}

impl NavOutcome {
    pub fn moved(self) -> bool {
        self == NavOutcome::Moved
    }
}

/// Position file for this session; separate per subset so each subset
/// resumes where it left off
pub fn position_file(config: &Config) -> PathBuf {
    let name = match config.subset_file() {
        Some(subset) => {
            let stem = subset
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            format!("position_{}.txt", stem)
        }
        None => "position.txt".to_string(),
    };
    config.session_dir().join(name)
}

/// Current position in the subset
///
/// `offset` always indexes `subset`; `step` is 1 in single-image mode and
/// the page size in grid mode.
#[derive(Debug, Clone)]
pub struct Navigator {
    subset: Vec<u32>,
    catalog_len: u32,
    offset: usize,
    step: usize,
    position_file: Option<PathBuf>,
}

impl Navigator {
    pub fn new(subset: Vec<u32>, catalog_len: usize, step: usize) -> Result<Self> {
        if subset.is_empty() {
            return Err(TaggerError::EmptySubset);
        }
        Ok(Self {
            subset,
            catalog_len: catalog_len as u32,
            offset: 0,
            step: step.max(1),
            position_file: None,
        })
    }

    /// Seed from `position_file` when present, otherwise start at the first
    /// subset element and create the file
    pub fn restore(subset: Vec<u32>, catalog_len: usize, step: usize, position_file: &Path) -> Result<Self> {
        let mut nav = Self::new(subset, catalog_len, step)?;
        nav.position_file = Some(position_file.to_path_buf());

        if position_file.exists() {
            let saved = tagger_fs::read_id_lines(position_file)
                .ok()
                .and_then(|ids| ids.first().copied());

            match saved {
                Some(id) => match nav.goto_nearest(id) {
                    Ok(resolved) => {
                        tracing::info!("Resumed at image {} (saved {})", resolved, id)
                    }
                    Err(e) => tracing::warn!("Ignoring saved position: {}", e),
                },
                None => tracing::warn!("Unreadable position file {:?}; starting at first image", position_file),
            }
        }

        nav.persist_position()?;
        Ok(nav)
    }

    /// Current image id
    pub fn current(&self) -> u32 {
        self.subset[self.offset]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.subset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subset.is_empty()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn subset(&self) -> &[u32] {
        &self.subset
    }

    pub fn catalog_len(&self) -> u32 {
        self.catalog_len
    }

    /// Ids shown on the current display: one in single mode, a page in grid mode
    pub fn current_page(&self) -> &[u32] {
        let end = (self.offset + self.step).min(self.subset.len());
        &self.subset[self.offset..end]
    }

    /// True when the current display already includes the last subset image
    pub fn is_at_last(&self) -> bool {
        self.offset + self.step >= self.subset.len()
    }

    pub fn next(&mut self) -> NavOutcome {
        if self.is_at_last() {
            return NavOutcome::AtLast;
        }
        self.offset += self.step;
        NavOutcome::Moved
    }

    pub fn previous(&mut self) -> NavOutcome {
        if self.offset == 0 {
            return NavOutcome::AtFirst;
        }
        self.offset = self.offset.saturating_sub(self.step);
        NavOutcome::Moved
    }

    pub fn first(&mut self) -> NavOutcome {
        if self.offset == 0 {
            return NavOutcome::AtFirst;
        }
        self.offset = 0;
        NavOutcome::Moved
    }

    /// Jump so the final display ends with the last subset image
    pub fn last(&mut self) -> NavOutcome {
        let target = self.subset.len().saturating_sub(self.step);
        if self.offset == target {
            return NavOutcome::AtLast;
        }
        self.offset = target;
        NavOutcome::Moved
    }

    /// Offset of the subset member numerically closest to `id`; the first
    /// member wins a tie
    fn nearest_offset(&self, id: u32) -> usize {
        self.subset
            .iter()
            .enumerate()
            .min_by_key(|(_, &member)| member.abs_diff(id))
            .map(|(offset, _)| offset)
            .unwrap_or(0)
    }

    /// Move to the subset image closest to catalog id `id`; returns the id reached
    pub fn goto_nearest(&mut self, id: u32) -> Result<u32> {
        if id == 0 || id > self.catalog_len {
            return Err(TaggerError::OutOfRange {
                requested: id,
                max: self.catalog_len,
            });
        }
        self.offset = self.nearest_offset(id);
        Ok(self.current())
    }

    /// Overwrite the position file with the current id
    pub fn persist_position(&self) -> Result<()> {
        if let Some(path) = &self.position_file {
            std::fs::write(path, format!("{}\n", self.current()))?;
        }
        Ok(())
    }

    /// "3/120" style position for status lines
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.offset + 1, self.subset.len())
    }
}
