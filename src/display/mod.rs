//! Display capability
//!
//! The wall talks to its panels only through the [`Display`] trait:
//! - geometry as the panel reports it (`width`, `height`, `rotation`)
//! - a blocking `render` that pushes one bitmap over the bus
//!
//! Bus/pin setup and the panel driver itself live outside this crate.

pub mod frame_dump;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a panel while pushing a frame
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] image::ImageError),
}

/// Panel rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when the panel is turned on its side (90 or 270)
    pub fn is_sideways(self) -> bool {
        self.degrees() % 180 == 90
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("rotation must be 0, 90, 180 or 270 (got {})", other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Presentation size of a panel after rotation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Effective geometry for a panel with the given native size and rotation.
    ///
    /// Panels are mounted for landscape viewing even though the native
    /// geometry is portrait, so a sideways rotation swaps the axes.
    pub fn effective(width: u32, height: u32, rotation: Rotation) -> Self {
        if rotation.is_sideways() {
            Geometry { width: height, height: width }
        } else {
            Geometry { width, height }
        }
    }
}

/// A single physical panel
pub trait Display {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Native panel width in pixels
    fn width(&self) -> u32;

    /// Native panel height in pixels
    fn height(&self) -> u32;

    fn rotation(&self) -> Rotation;

    /// Push a bitmap to the panel. Blocks until the transfer is done.
    fn render(&mut self, frame: &RgbImage) -> Result<(), DisplayError>;

    fn geometry(&self) -> Geometry {
        Geometry::effective(self.width(), self.height(), self.rotation())
    }
}

/// Clear a panel to black
pub fn blank<D: Display + ?Sized>(display: &mut D) -> Result<(), DisplayError> {
    let geometry = display.geometry();
    let frame = RgbImage::from_pixel(geometry.width, geometry.height, Rgb([0, 0, 0]));
    display.render(&frame)
}
