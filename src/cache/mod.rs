//! Thumbnail cache
//!
//! This module handles:
//! - Cover-fit geometry (fit.rs)
//! - Generating display-sized thumbnails and caching them next to the source (thumbnail.rs)

pub mod fit;
pub mod thumbnail;
