//! Per-tag image index files
//!
//! Every tag owns `TAG_DIR/<label>.txt` listing the ids of images carrying
//! it, one per line. Additions append a line; deletions and the shutdown
//! flush rewrite the file in ascending order behind a `.bak` copy. A `.bak`
//! left over at startup means an earlier rewrite never finished, and the
//! session refuses to start until it has been resolved by hand.

use crate::tags::{TagId, TagRegistry};
use crate::{Result, TaggerError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Result of [`TagIndex::add_tag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyTagged,
}

/// Result of [`TagIndex::delete_tag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    NotTagged,
}

/// Result of [`TagIndex::toggle_tag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// In-memory mirror of every tag's index file
#[derive(Debug)]
pub struct TagIndex {
    dir: PathBuf,
    sets: BTreeMap<TagId, HashSet<u32>>,
    files: HashMap<TagId, PathBuf>,
}

/// Index file path for a tag label
pub fn index_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{}.txt", label))
}

impl TagIndex {
    /// Fail if any backup file is left in `dir` from an interrupted session
    pub fn ensure_no_stale_backups(dir: &Path) -> Result<()> {
        if let Some(stale) = tagger_fs::find_backups(dir)?.into_iter().next() {
            tracing::error!("Stale backup present: {:?}", stale);
            return Err(TaggerError::StaleBackupPresent(stale));
        }
        Ok(())
    }

    /// Load every registered tag's index file, creating missing ones empty
    pub fn load(dir: &Path, registry: &TagRegistry) -> Result<Self> {
        Self::ensure_no_stale_backups(dir)?;

        let mut sets = BTreeMap::new();
        let mut files = HashMap::new();

        for tag in registry.iter() {
            let path = index_path(dir, &tag.label);

            let set: HashSet<u32> = if path.exists() {
                tagger_fs::read_id_lines(&path)?.into_iter().collect()
            } else {
                std::fs::File::create(&path)?;
                tracing::info!("Created empty index {:?}", path);
                HashSet::new()
            };

            tracing::debug!("Tag {} ({}): {} images", tag.id, tag.label, set.len());
            sets.insert(tag.id, set);
            files.insert(tag.id, path);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            sets,
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn set(&self, tag: TagId) -> Result<&HashSet<u32>> {
        self.sets.get(&tag).ok_or(TaggerError::UnknownTag(tag))
    }

    fn file(&self, tag: TagId) -> Result<&Path> {
        self.files
            .get(&tag)
            .map(PathBuf::as_path)
            .ok_or(TaggerError::UnknownTag(tag))
    }

    /// Tag an image, appending it to the tag's index file
    pub fn add_tag(&mut self, tag: TagId, image: u32) -> Result<AddOutcome> {
        let path = self.file(tag)?.to_path_buf();
        let set = self.sets.get_mut(&tag).ok_or(TaggerError::UnknownTag(tag))?;

        if set.contains(&image) {
            return Ok(AddOutcome::AlreadyTagged);
        }

        tagger_fs::append_line(&path, image)?;
        set.insert(image);
        tracing::info!(tag, image, "Tag added");
        Ok(AddOutcome::Added)
    }

    /// Untag an image, rewriting the tag's index file sorted
    pub fn delete_tag(&mut self, tag: TagId, image: u32) -> Result<DeleteOutcome> {
        let removed = self
            .sets
            .get_mut(&tag)
            .ok_or(TaggerError::UnknownTag(tag))?
            .remove(&image);

        if !removed {
            return Ok(DeleteOutcome::NotTagged);
        }

        self.rewrite(tag)?;
        tracing::info!(tag, image, "Tag removed");
        Ok(DeleteOutcome::Removed)
    }

    /// Add the tag if absent, otherwise remove it
    pub fn toggle_tag(&mut self, tag: TagId, image: u32) -> Result<ToggleOutcome> {
        if self.is_tagged(tag, image)? {
            self.delete_tag(tag, image)?;
            Ok(ToggleOutcome::Removed)
        } else {
            self.add_tag(tag, image)?;
            Ok(ToggleOutcome::Added)
        }
    }

    /// Rewrite one tag's file from memory, ascending
    fn rewrite(&self, tag: TagId) -> Result<()> {
        let path = self.file(tag)?;
        let sorted = self.images_for_tag(tag)?;
        tagger_fs::rewrite_with_backup(path, sorted)?;
        Ok(())
    }

    /// Rewrite every index file sorted; run at shutdown
    pub fn flush_all_sorted(&self) -> Result<()> {
        for &tag in self.sets.keys() {
            self.rewrite(tag)?;
        }
        tracing::info!("Flushed {} tag indexes", self.sets.len());
        Ok(())
    }

    pub fn is_tagged(&self, tag: TagId, image: u32) -> Result<bool> {
        Ok(self.set(tag)?.contains(&image))
    }

    /// Images carrying `tag`, ascending
    pub fn images_for_tag(&self, tag: TagId) -> Result<Vec<u32>> {
        let mut images: Vec<u32> = self.set(tag)?.iter().copied().collect();
        images.sort_unstable();
        Ok(images)
    }

    /// Tags carried by `image`, ascending
    pub fn tags_for_image(&self, image: u32) -> Vec<TagId> {
        self.sets
            .iter()
            .filter(|(_, set)| set.contains(&image))
            .map(|(&tag, _)| tag)
            .collect()
    }

    /// Image count per tag, ascending by tag id
    pub fn counts(&self) -> Vec<(TagId, usize)> {
        self.sets.iter().map(|(&tag, set)| (tag, set.len())).collect()
    }

    /// Write a tag's images as a subset file usable by a later session
    pub fn export_subset(&self, tag: TagId, path: &Path) -> Result<usize> {
        let images = self.images_for_tag(tag)?;
        tagger_fs::write_lines(path, &images)?;
        tracing::info!("Exported {} images of tag {} to {:?}", images.len(), tag, path);
        Ok(images.len())
    }
}
