//! Error types shared by every stage of the display wall.
//!
//! All of these are fatal: they propagate to `main` and end the process.
//! Cache read failures are deliberately absent, those are recovered by
//! regenerating the thumbnail.

use std::path::PathBuf;
use thiserror::Error;

use crate::display::DisplayError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, WallError>;

#[derive(Debug, Error)]
pub enum WallError {
    /// File name does not follow `YYYY-MM-DD_HH-MM.<discriminator>.<ext>`
    #[error("cannot derive capture key from '{file}': {reason}")]
    Naming { file: String, reason: String },

    /// A file landed in a set whose first file came from another capture event
    #[error("inconsistent naming around {}: expected capture '{expected}', found '{found}'", file.display())]
    InconsistentSet {
        file: PathBuf,
        expected: String,
        found: String,
    },

    /// A source image could not be opened or decoded
    #[error("failed to decode image {}: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },

    /// Nothing to show
    #[error("no images: {0}")]
    NoImages(String),

    #[error("failed to scan {}: {source}", dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("display '{display}' failed: {source}")]
    Display {
        display: String,
        #[source]
        source: DisplayError,
    },

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("invalid display geometry: {0}")]
    InvalidGeometry(String),
}
