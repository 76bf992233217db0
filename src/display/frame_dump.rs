//! Headless panel backend.
//!
//! Writes the most recent frame of each panel to `<dir>/<name>.png`. Used on
//! hosts without a panel driver, and handy for checking what a wall would show.

use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Display, DisplayError, Rotation};

pub struct FrameDumpDisplay {
    name: String,
    width: u32,
    height: u32,
    rotation: Rotation,
    frame_path: PathBuf,
}

impl FrameDumpDisplay {
    /// Create a panel that dumps into `dir`, creating the directory if needed
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        rotation: Rotation,
        dir: &Path,
    ) -> Result<Self, DisplayError> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            rotation,
            frame_path: dir.join(format!("{}.png", name)),
        })
    }

    /// Where the latest frame lands
    pub fn frame_path(&self) -> &Path {
        &self.frame_path
    }
}

impl Display for FrameDumpDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn render(&mut self, frame: &RgbImage) -> Result<(), DisplayError> {
        // Write next to the target and rename so readers never see a partial PNG
        let staging = self.frame_path.with_extension("png.part");
        frame.save_with_format(&staging, ImageFormat::Png)?;
        fs::rename(&staging, &self.frame_path)?;

        debug!("🖥️  {} ← {}x{}", self.name, frame.width(), frame.height());
        Ok(())
    }
}
