//! Image library state
//!
//! This module handles everything known about the image folder:
//! - Capture keys, image files and sets (data.rs)
//! - Scanning the folder and grouping files into sets (library.rs)

pub mod data;
pub mod library;
