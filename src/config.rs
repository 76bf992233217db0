//! Wall configuration
//!
//! Stored as JSON in the user's config directory:
//! - Linux: ~/.config/display-wall/config.json
//! - macOS: ~/Library/Application Support/display-wall/config.json
//! - Windows: %APPDATA%\display-wall\config.json
//!
//! On first run the defaults are written there. They describe three 1.14"
//! ST7789 panels mounted sideways.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::cache::thumbnail::DEFAULT_JPEG_QUALITY;
use crate::display::Rotation;
use crate::error::{Result, WallError};

const APP_DIR: &str = "display-wall";

/// One physical panel
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Name used in logs (and as the frame file name for the headless backend)
    pub name: String,
    /// Native panel width in pixels
    pub width: u32,
    /// Native panel height in pixels
    pub height: u32,
    /// 0, 90, 180 or 270
    #[serde(default)]
    pub rotation: Rotation,
}

impl DisplayConfig {
    fn st7789(name: &str) -> Self {
        Self {
            name: name.to_string(),
            width: 135,
            height: 240,
            rotation: Rotation::Deg90,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Folder holding the `YYYY-MM-DD_HH-MM.<n>.<ext>` images
    pub image_dir: PathBuf,

    /// Panels in slot order: slot 0 of every set goes to the first entry
    pub displays: Vec<DisplayConfig>,

    /// Pause after blanking, before the first set
    pub settle_delay_ms: u64,

    /// Quality of cached thumbnails (1-100)
    pub jpeg_quality: u8,

    /// Build all thumbnails before the first set is shown
    pub prewarm: bool,

    /// Where the headless backend writes frames
    pub frame_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            displays: vec![
                DisplayConfig::st7789("a"),
                DisplayConfig::st7789("b"),
                DisplayConfig::st7789("c"),
            ],
            settle_delay_ms: 2000,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            prewarm: true,
            frame_dir: Self::default_frame_dir(),
        }
    }
}

impl Config {
    /// Get the path where the config file lives
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    fn default_frame_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join(APP_DIR).join("frames"))
            .unwrap_or_else(|| PathBuf::from("frames"))
    }

    /// Load from the default location.
    ///
    /// With no file yet, the defaults are used and written out as a starting
    /// point to edit.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            warn!("⚠️  No config directory on this platform, using defaults");
            return Ok(Self::default());
        };
        if path.exists() {
            info!("📁 Loading config from {}", path.display());
            return Self::load_from(&path);
        }

        let config = Self::default();
        match config.save_to(&path) {
            Ok(()) => info!("📁 Wrote default config to {}", path.display()),
            Err(e) => warn!("⚠️  Using defaults, could not write config: {}", e),
        }
        Ok(config)
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_error = |reason: String| WallError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let json = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = Self::from_json(&json).map_err(|e| config_error(e.to_string()))?;
        config.validate().map_err(config_error)?;

        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_error = |reason: String| WallError::Config {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| config_error(e.to_string()))?;
        }
        let json = self.to_json().map_err(|e| config_error(e.to_string()))?;
        fs::write(path, json).map_err(|e| config_error(e.to_string()))
    }

    /// Convert to a JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.displays.is_empty() {
            return Err("at least one display is required".to_string());
        }
        for display in &self.displays {
            if display.width == 0 || display.height == 0 {
                return Err(format!(
                    "display '{}' has an empty geometry ({}x{})",
                    display.name, display.width, display.height
                ));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("jpeg_quality must be 1-100 (got {})", self.jpeg_quality));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
