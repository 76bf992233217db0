//! Records produced by the directory scan.
//!
//! File names carry the capture metadata. They are parsed once, here, and the
//! rest of the pipeline only looks at these types.

use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::path::PathBuf;

use crate::error::{Result, WallError};

/// Timestamp layout at the start of every source file name
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Sort and group key derived from a file name like `2021-06-01_14-30.1.jpg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureKey {
    /// Timestamp component exactly as written (`2021-06-01_14-30`)
    pub stamp: String,
    /// Parsed capture time
    pub taken_at: NaiveDateTime,
    /// Second dot-separated segment (`1`)
    pub discriminator: String,
}

impl CaptureKey {
    /// Parse a bare file name (no directories)
    pub fn parse(file_name: &str) -> Result<Self> {
        let naming_error = |reason: &str| WallError::Naming {
            file: file_name.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = file_name.split('.').collect();
        if segments.len() < 2 {
            return Err(naming_error(
                "expected <YYYY-MM-DD_HH-MM>.<discriminator>[.<ext>]",
            ));
        }

        let stamp = segments[0];
        let discriminator = segments[1];
        if discriminator.is_empty() {
            return Err(naming_error("empty discriminator"));
        }

        let taken_at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map_err(|e| naming_error(&format!("bad timestamp '{}': {}", stamp, e)))?;

        Ok(Self {
            stamp: stamp.to_string(),
            taken_at,
            discriminator: discriminator.to_string(),
        })
    }

    /// Two keys come from the same capture event iff their timestamps match
    pub fn same_capture(&self, other: &CaptureKey) -> bool {
        self.stamp == other.stamp
    }

    /// Numeric discriminators compare as numbers, the rest as text
    fn discriminator_rank(&self) -> (Option<u64>, &str) {
        (self.discriminator.parse().ok(), &self.discriminator)
    }
}

impl Ord for CaptureKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.taken_at
            .cmp(&other.taken_at)
            .then_with(|| self.stamp.cmp(&other.stamp))
            .then_with(|| self.discriminator_rank().cmp(&other.discriminator_rank()))
    }
}

impl PartialOrd for CaptureKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Represents a single source image on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Full path to the image
    pub path: PathBuf,
    pub key: CaptureKey,
    /// Position within its set, which is also the display it goes to
    pub slot: usize,
}

impl ImageFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Images from one capture event, one per display slot.
///
/// The last set of a scan may hold fewer files than there are displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    files: Vec<ImageFile>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next slot, rejecting a file from a different capture event
    pub fn push(&mut self, path: PathBuf, key: CaptureKey) -> Result<()> {
        if let Some(first) = self.files.first() {
            if !first.key.same_capture(&key) {
                return Err(WallError::InconsistentSet {
                    file: path,
                    expected: first.key.stamp.clone(),
                    found: key.stamp,
                });
            }
        }

        let slot = self.files.len();
        self.files.push(ImageFile { path, key, slot });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    /// Timestamp shared by every file in the set
    pub fn stamp(&self) -> Option<&str> {
        self.files.first().map(|file| file.key.stamp.as_str())
    }
}
