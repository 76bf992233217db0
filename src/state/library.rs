use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::data::{CaptureKey, ImageSet};
use crate::cache::thumbnail::is_thumbnail_name;
use crate::error::{Result, WallError};

/// Turns an image folder into ordered, per-capture sets.
///
/// Files are sorted by capture time and dealt out `display_count` at a time.
/// Every file in a set must share the first file's timestamp; the last set
/// may be short.
#[derive(Debug, Clone)]
pub struct ImageSetGrouper {
    display_count: usize,
}

impl ImageSetGrouper {
    pub fn new(display_count: usize) -> Result<Self> {
        if display_count == 0 {
            return Err(WallError::InvalidGeometry(
                "at least one display is required".to_string(),
            ));
        }
        Ok(Self { display_count })
    }

    /// Scan `dir` and build the sets, earliest capture first
    pub fn build(&self, dir: &Path) -> Result<Vec<ImageSet>> {
        info!("🔍 Scanning folder: {}", dir.display());

        let images = scan_images(dir)?;
        if images.is_empty() {
            return Err(WallError::NoImages(format!(
                "nothing to show in {}",
                dir.display()
            )));
        }

        let sets = self.group(images)?;
        info!(
            "✅ Found {} sets for {} displays in {}",
            sets.len(),
            self.display_count,
            dir.display()
        );
        Ok(sets)
    }

    /// Sort by capture key and cut into consecutive sets
    fn group(&self, mut images: Vec<(PathBuf, CaptureKey)>) -> Result<Vec<ImageSet>> {
        images.sort_by(|(a_path, a_key), (b_path, b_key)| {
            a_key.cmp(b_key).then_with(|| a_path.cmp(b_path))
        });

        let mut sets = Vec::new();
        let mut current = ImageSet::new();
        for (path, key) in images {
            if current.len() == self.display_count {
                sets.push(std::mem::take(&mut current));
            }
            current.push(path, key)?;
        }
        if !current.is_empty() {
            sets.push(current);
        }

        Ok(sets)
    }
}

/// List the source images directly inside `dir`, skipping cached thumbnails
fn scan_images(dir: &Path) -> Result<Vec<(PathBuf, CaptureKey)>> {
    let mut images = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| WallError::Scan {
            dir: dir.to_path_buf(),
            source,
        })?;

        // Only process files (not directories)
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if is_thumbnail_name(&file_name) {
            debug!("Skipping cached thumbnail {}", file_name);
            continue;
        }

        let key = CaptureKey::parse(&file_name)?;
        images.push((entry.into_path(), key));
    }

    Ok(images)
}
