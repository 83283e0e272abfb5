//! Fixed-size thumbnail generation for grid mode

use crate::catalog;
use crate::{Config, Result};
use image::ImageReader;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Counts from one generator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailReport {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobOutcome {
    Generated,
    Skipped,
    Failed,
}

/// Thumbnail generator
pub struct ThumbnailGenerator {
    size: u32,
    force: bool,
}

impl ThumbnailGenerator {
    pub fn new(size: u32) -> Self {
        Self { size, force: false }
    }

    /// Regenerate thumbnails that already exist
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Decode `source`, resize to exactly `size × size` and save to `target`
    pub fn generate(&self, source: &Path, target: &Path) -> Result<()> {
        let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
        let thumb = img.thumbnail_exact(self.size, self.size);

        let jpeg = target
            .extension()
            .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);

        // JPEG has no alpha channel
        if jpeg {
            thumb.to_rgb8().save(target)?;
        } else {
            thumb.save(target)?;
        }
        Ok(())
    }

    fn run_job(&self, source: &Path, target: &Path) -> JobOutcome {
        if !self.force && target.exists() {
            return JobOutcome::Skipped;
        }
        match self.generate(source, target) {
            Ok(()) => {
                tracing::debug!("Thumbnail {:?}", target);
                JobOutcome::Generated
            }
            Err(e) => {
                tracing::warn!("Thumbnail for {:?} failed: {}", source, e);
                JobOutcome::Failed
            }
        }
    }

    /// Generate thumbnails for (source, target) pairs in parallel
    pub fn generate_batch(&self, jobs: &[(PathBuf, PathBuf)]) -> ThumbnailReport {
        let outcomes: Vec<JobOutcome> = jobs
            .par_iter()
            .map(|(source, target)| self.run_job(source, target))
            .collect();

        let mut report = ThumbnailReport::default();
        for outcome in outcomes {
            match outcome {
                JobOutcome::Generated => report.generated += 1,
                JobOutcome::Skipped => report.skipped += 1,
                JobOutcome::Failed => report.failed += 1,
            }
        }
        report
    }
}

/// Generate thumbnails for every catalog image of a session
pub fn generate_for_session(config: &Config, force: bool) -> Result<ThumbnailReport> {
    let images = catalog::load_or_scan_images(config)?;
    let targets = catalog::thumbnail_paths(config, &images);

    let thumb_dir = config.thumb_dir();
    std::fs::create_dir_all(&thumb_dir)?;

    let generator = ThumbnailGenerator::new(config.thumb_size()?).force(force);
    let jobs: Vec<(PathBuf, PathBuf)> = images.into_iter().zip(targets).collect();

    tracing::info!(
        "Generating {}px thumbnails for {} images into {:?}",
        generator.size(),
        jobs.len(),
        thumb_dir
    );
    let report = generator.generate_batch(&jobs);
    tracing::info!(
        generated = report.generated,
        skipped = report.skipped,
        failed = report.failed,
        "Thumbnail run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn write_png(path: &Path, w: u32, h: u32) {
        RgbImage::from_pixel(w, h, image::Rgb([200, 40, 40])).save(path).unwrap();
    }

    #[test]
    fn test_generate_exact_size() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("wide.png");
        let dst = dir.path().join("wide_thumb.jpg");
        write_png(&src, 64, 20);

        ThumbnailGenerator::new(16).generate(&src, &dst).unwrap();
        let thumb = image::open(&dst).unwrap();
        assert_eq!(thumb.dimensions(), (16, 16));
    }

    #[test]
    fn test_session_run_skips_and_counts_failures() {
        let root = TempDir::new().unwrap();
        let session = root.path().join("session");
        let images = root.path().join("images");
        fs::create_dir(&session).unwrap();
        fs::create_dir(&images).unwrap();
        write_png(&images.join("a1.png"), 30, 30);
        write_png(&images.join("a2.png"), 10, 40);
        fs::write(images.join("a3.png"), b"not an image").unwrap();

        let cfg = Config::parse(&format!(
            "SESSION_DIR {}\nIMAGE_DIR {}\nIMAGE_EXT png\nTHUMB_EXT png\nTHUMB_SIZE 8\n",
            session.display(),
            images.display()
        ))
        .unwrap();

        let report = generate_for_session(&cfg, false).unwrap();
        assert_eq!(report, ThumbnailReport { generated: 2, skipped: 0, failed: 1 });

        let thumb = image::open(session.join("thumbs").join("a2_thumb.png")).unwrap();
        assert_eq!(thumb.dimensions(), (8, 8));

        let report = generate_for_session(&cfg, false).unwrap();
        assert_eq!(report, ThumbnailReport { generated: 0, skipped: 2, failed: 1 });

        let report = generate_for_session(&cfg, true).unwrap();
        assert_eq!(report.generated, 2);
    }
}
