//! Image catalog and session subset
//!
//! The catalog is the ordered list of every image in the session; image ids
//! are 1-based positions in it. It is scanned once and cached in
//! `images.txt` under the session directory so ids stay stable across
//! sessions even if files are added to the image directory later.

use crate::{Config, DisplayMode, Result, TaggerError};
use std::path::{Path, PathBuf};
use tagger_fs::{FsError, ListOptions};

/// Catalog list file name inside the session directory
pub const CATALOG_FILE: &str = "images.txt";

/// Ordered image paths with optional index-aligned thumbnails
#[derive(Debug, Clone)]
pub struct Catalog {
    images: Vec<PathBuf>,
    thumbnails: Option<Vec<PathBuf>>,
}

impl Catalog {
    pub fn new(images: Vec<PathBuf>, thumbnails: Option<Vec<PathBuf>>) -> Result<Self> {
        if images.is_empty() {
            return Err(TaggerError::EmptyCatalog);
        }
        Ok(Self { images, thumbnails })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image path for a 1-based id
    pub fn image(&self, id: u32) -> Option<&Path> {
        Self::slot(id).and_then(|i| self.images.get(i)).map(PathBuf::as_path)
    }

    /// Thumbnail path for a 1-based id (grid mode only)
    pub fn thumbnail(&self, id: u32) -> Option<&Path> {
        let thumbs = self.thumbnails.as_ref()?;
        Self::slot(id).and_then(|i| thumbs.get(i)).map(PathBuf::as_path)
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn has_thumbnails(&self) -> bool {
        self.thumbnails.is_some()
    }

    fn slot(id: u32) -> Option<usize> {
        (id as usize).checked_sub(1)
    }
}

/// Path of the persisted catalog list
pub fn catalog_file(config: &Config) -> PathBuf {
    config.session_dir().join(CATALOG_FILE)
}

/// Read the persisted image list, or scan the image directory and persist it
pub fn load_or_scan_images(config: &Config) -> Result<Vec<PathBuf>> {
    let list_file = catalog_file(config);

    let images: Vec<PathBuf> = if list_file.exists() {
        let images: Vec<PathBuf> = tagger_fs::read_lines(&list_file)?
            .into_iter()
            .map(PathBuf::from)
            .collect();
        tracing::info!("Loaded {} images from {:?}", images.len(), list_file);
        images
    } else {
        let options = ListOptions::with_extension(config.image_ext());
        let images = match tagger_fs::list_images(config.image_dir(), &options) {
            Ok(images) => images,
            Err(FsError::NotFound(dir)) | Err(FsError::NotADirectory(dir)) => {
                return Err(TaggerError::MissingDirectory(dir))
            }
            Err(e) => return Err(e.into()),
        };

        if !images.is_empty() {
            tagger_fs::write_lines(&list_file, images.iter().map(|p| p.display()))?;
            tracing::info!("Scanned {} images, wrote {:?}", images.len(), list_file);
        }
        images
    };

    if images.is_empty() {
        return Err(TaggerError::EmptyCatalog);
    }
    Ok(images)
}

/// Derive `THUMB_DIR/<stem><THUMB_SUFFIX>.<THUMB_EXT>` for each image
pub fn thumbnail_paths(config: &Config, images: &[PathBuf]) -> Vec<PathBuf> {
    let dir = config.thumb_dir();
    let suffix = config.thumb_suffix();
    let ext = config.thumb_ext().trim_start_matches('.');

    images
        .iter()
        .map(|image| {
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy())
                .unwrap_or_default();
            dir.join(format!("{}{}.{}", stem, suffix, ext))
        })
        .collect()
}

/// Build the catalog; in grid mode also resolve and spot-check thumbnails
pub fn build_catalog(config: &Config) -> Result<Catalog> {
    let images = load_or_scan_images(config)?;

    let thumbnails = match config.mode() {
        DisplayMode::Single => None,
        DisplayMode::Grid => {
            let thumbs = thumbnail_paths(config, &images);
            // First and last only; a full check would stat every file on startup.
            for probe in [thumbs.first(), thumbs.last()].into_iter().flatten() {
                if !probe.exists() {
                    return Err(TaggerError::MissingThumbnails(probe.clone()));
                }
            }
            Some(thumbs)
        }
    };

    Catalog::new(images, thumbnails)
}

/// Ids exposed this session: the configured subset file, or all of `1..=N`
pub fn build_subset(config: &Config, catalog: &Catalog) -> Result<Vec<u32>> {
    let path = match config.subset_file() {
        None => return Ok((1..=catalog.len() as u32).collect()),
        Some(path) => path,
    };

    let ids = match tagger_fs::read_id_lines(&path) {
        Ok(ids) => ids,
        Err(FsError::NotFound(p)) => return Err(TaggerError::MissingSubsetFile(p)),
        Err(e) => return Err(e.into()),
    };

    let max = catalog.len();
    if let Some(&bad) = ids.iter().find(|&&id| id == 0 || id as usize > max) {
        return Err(TaggerError::InvalidSubsetEntry { id: bad, max });
    }

    if ids.is_empty() {
        return Err(TaggerError::EmptySubset);
    }

    tracing::info!("Subset {:?}: {} of {} images", path, ids.len(), max);
    Ok(ids)
}
