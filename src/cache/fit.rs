//! Cover-fit math: scale a source so it fills the target on both axes, then
//! crop the overflow evenly from both sides.

use crate::display::Geometry;

/// Scaled size and crop window for one source/target pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverFit {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Compute the cover-fit for a `source_width` x `source_height` image.
///
/// Both source dimensions must be non-zero. The scaled size is never smaller
/// than the target on either axis, so the crop window always fits.
pub fn cover_fit(source_width: u32, source_height: u32, target: Geometry) -> CoverFit {
    let (sw, sh) = (u64::from(source_width), u64::from(source_height));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));

    // screen_ratio < image_ratio, i.e. tw/th < sw/sh, without floats
    let (scaled_width, scaled_height) = if tw * sh < sw * th {
        (sw * th / sh, th)
    } else {
        (tw, sh * tw / sw)
    };

    CoverFit {
        scaled_width: scaled_width as u32,
        scaled_height: scaled_height as u32,
        crop_x: (scaled_width / 2 - tw / 2) as u32,
        crop_y: (scaled_height / 2 - th / 2) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(width: u32, height: u32) -> Geometry {
        Geometry { width, height }
    }

    #[test]
    fn test_wide_source_matches_height() {
        // 4000x1000 onto 240x135: image is wider than the screen
        let fit = cover_fit(4000, 1000, target(240, 135));
        assert_eq!(fit.scaled_height, 135);
        assert_eq!(fit.scaled_width, 540);
        assert_eq!(fit.crop_x, 270 - 120);
        assert_eq!(fit.crop_y, 0);
    }

    #[test]
    fn test_tall_source_matches_width() {
        let fit = cover_fit(1000, 3000, target(240, 135));
        assert_eq!(fit.scaled_width, 240);
        assert_eq!(fit.scaled_height, 720);
        assert_eq!(fit.crop_x, 0);
        assert_eq!(fit.crop_y, 360 - 67);
    }

    #[test]
    fn test_same_ratio_is_exact() {
        let fit = cover_fit(480, 270, target(240, 135));
        assert_eq!(
            fit,
            CoverFit { scaled_width: 240, scaled_height: 135, crop_x: 0, crop_y: 0 }
        );
    }

    #[test]
    fn test_scaled_always_covers_target() {
        let targets = [target(240, 135), target(135, 240), target(1, 1), target(320, 240)];
        for &t in &targets {
            for sw in [1u32, 2, 3, 7, 135, 239, 240, 241, 1001, 4032] {
                for sh in [1u32, 2, 5, 134, 135, 136, 999, 3024] {
                    let fit = cover_fit(sw, sh, t);
                    assert!(fit.scaled_width >= t.width, "{}x{} -> {:?}", sw, sh, t);
                    assert!(fit.scaled_height >= t.height, "{}x{} -> {:?}", sw, sh, t);
                    assert!(fit.crop_x + t.width <= fit.scaled_width);
                    assert!(fit.crop_y + t.height <= fit.scaled_height);
                }
            }
        }
    }
}
