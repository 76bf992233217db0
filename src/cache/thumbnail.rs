use image::codecs::jpeg::JpegEncoder;
use image::{imageops, imageops::FilterType, RgbImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::fit::cover_fit;
use crate::display::{Display, Geometry};
use crate::error::{Result, WallError};

/// Default JPEG quality for cached thumbnails
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Marker segment that identifies a cache artifact by name
pub const THUMB_MARKER: &str = "thumb";

/// Get the thumbnail path for a source image (doesn't generate, just returns the expected path)
///
/// The base name is cut at its first `.`, so `2021-06-01_14-30.1.jpg`
/// caches to `2021-06-01_14-30.thumb.jpg`. Sources that share a timestamp
/// but differ in discriminator therefore share one cache file.
pub fn get_thumbnail_path(source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    source.with_file_name(format!("{}.{}.jpg", stem, THUMB_MARKER))
}

/// True if a file name marks a cache artifact rather than a source image
pub fn is_thumbnail_name(file_name: &str) -> bool {
    file_name.split('.').any(|segment| segment == THUMB_MARKER)
}

/// Check if a thumbnail exists for a source image
pub fn thumbnail_exists(source: &Path) -> bool {
    get_thumbnail_path(source).exists()
}

/// Produces display-sized bitmaps and persists them next to their sources.
///
/// The first request for an image decodes, scales and crops it, then writes the
/// result as JPEG. Later requests just read that file back. A missing or
/// unreadable cache file is never an error: the thumbnail is rebuilt.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    jpeg_quality: u8,
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ThumbnailCache {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Bitmap for `source`, sized for the display's effective geometry
    pub fn get<D: Display + ?Sized>(&self, display: &D, source: &Path) -> Result<RgbImage> {
        self.get_for(display.geometry(), source)
    }

    /// Same as [`ThumbnailCache::get`], with the geometry given directly
    pub fn get_for(&self, geometry: Geometry, source: &Path) -> Result<RgbImage> {
        let thumb_path = get_thumbnail_path(source);

        match image::open(&thumb_path) {
            Ok(cached) => {
                let cached = cached.to_rgb8();
                if cached.dimensions() != (geometry.width, geometry.height) {
                    warn!(
                        "⚠️  Cached thumbnail {} is {}x{}, display wants {}x{} (delete it to rebuild)",
                        thumb_path.display(),
                        cached.width(),
                        cached.height(),
                        geometry.width,
                        geometry.height
                    );
                }
                debug!("Cache hit: {}", thumb_path.display());
                Ok(cached)
            }
            Err(e) => {
                debug!("Cache miss for {} ({})", thumb_path.display(), e);
                self.generate_thumbnail(geometry, source, &thumb_path)
            }
        }
    }

    /// Decode, cover-fit and persist one thumbnail
    fn generate_thumbnail(&self, geometry: Geometry, source: &Path, thumb_path: &Path) -> Result<RgbImage> {
        let decode_error = |reason: String| WallError::ImageDecode {
            path: source.to_path_buf(),
            reason,
        };

        if geometry.width == 0 || geometry.height == 0 {
            return Err(WallError::InvalidGeometry(format!(
                "{}x{}",
                geometry.width, geometry.height
            )));
        }
        let img = image::open(source).map_err(|e| decode_error(e.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(decode_error(format!("empty image ({}x{})", img.width(), img.height())));
        }

        let fit = cover_fit(img.width(), img.height(), geometry);
        let scaled = imageops::resize(
            &img.to_rgb8(),
            fit.scaled_width,
            fit.scaled_height,
            FilterType::CatmullRom,
        );
        let thumbnail =
            imageops::crop_imm(&scaled, fit.crop_x, fit.crop_y, geometry.width, geometry.height)
                .to_image();

        match self.save_thumbnail(&thumbnail, thumb_path) {
            Ok(()) => info!("📸 Generated thumbnail: {}", thumb_path.display()),
            Err(e) => warn!("⚠️  Could not cache thumbnail {}: {}", thumb_path.display(), e),
        }

        Ok(thumbnail)
    }

    /// Helper to save a thumbnail as JPEG.
    ///
    /// The encoder writes to a staging file next to the cache path, which is
    /// renamed into place once complete. An interrupted write never leaves a
    /// truncated JPEG where `get` would serve it.
    fn save_thumbnail(&self, thumbnail: &RgbImage, thumb_path: &Path) -> image::ImageResult<()> {
        let staging = staging_path(thumb_path);
        let written = self.encode_to(thumbnail, &staging).and_then(|()| {
            fs::rename(&staging, thumb_path)?;
            Ok(())
        });
        if written.is_err() {
            let _ = fs::remove_file(&staging);
        }
        written
    }

    fn encode_to(&self, thumbnail: &RgbImage, path: &Path) -> image::ImageResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        thumbnail.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality))?;
        writer.flush()?;
        Ok(())
    }
}

/// In-progress name for a thumbnail (`<base>.thumb.jpg.part`)
fn staging_path(thumb_path: &Path) -> PathBuf {
    thumb_path.with_extension("jpg.part")
}
