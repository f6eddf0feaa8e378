//! Scalar pixel math: BT.601 YUV to RGB and the ProcAmp adjustments
//!
//! All functions are pure. The per-frame structs (`HueRotation`, `BcsAdjust`)
//! hoist the trigonometry and float factors out of the pixel loop; they give
//! the same results as the free functions.

use crate::types::{ProcAmpParams, NEUTRAL};
use std::f32::consts::PI;

/// Saturate to the 8-bit range
#[inline(always)]
pub fn clamp8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Integer BT.601 studio-range conversion.
///
/// Y outside 16..=235 is not re-ranged; it saturates at the clamp.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    [clamp8(r), clamp8(g), clamp8(b)]
}

/// Chroma rotation around (128, 128)
#[derive(Debug, Clone, Copy)]
pub struct HueRotation {
    cos: f32,
    sin: f32,
}

impl HueRotation {
    /// 0 maps to -pi, 128 to 0, 255 to just under +pi
    pub fn new(hue: u8) -> Self {
        let angle = (hue as f32 - NEUTRAL as f32) * (PI / 128.0);
        HueRotation {
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    #[inline]
    pub fn rotate(&self, u: u8, v: u8) -> (u8, u8) {
        let u = u as f32 - 128.0;
        let v = v as f32 - 128.0;

        // +0.5 then truncate: round half up for the non-negative results that survive the clamp
        let u2 = (u * self.cos - v * self.sin + 128.0 + 0.5) as i32;
        let v2 = (u * self.sin + v * self.cos + 128.0 + 0.5) as i32;

        (clamp8(u2), clamp8(v2))
    }
}

/// Rotate one chroma pair by the angle `hue` encodes
pub fn apply_hue(u: u8, v: u8, hue: u8) -> (u8, u8) {
    HueRotation::new(hue).rotate(u, v)
}

/// Brightness, contrast and saturation factors for one frame
#[derive(Debug, Clone, Copy)]
pub struct BcsAdjust {
    brightness: f32,
    contrast: f32,
    saturation: f32,
}

impl BcsAdjust {
    pub fn new(params: &ProcAmpParams) -> Self {
        BcsAdjust {
            // Roughly -255..+255
            brightness: (params.brightness as f32 - 128.0) / 128.0 * 255.0,
            // 0 is flat, 128 identity, 255 close to 2x
            contrast: params.contrast as f32 / 128.0,
            saturation: params.saturation as f32 / 128.0,
        }
    }

    /// Brightness and contrast first, then saturation around the integer gray
    #[inline]
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        let bc = rgb.map(|c| {
            clamp8(((c as i32 - 128) as f32 * self.contrast + 128.0 + self.brightness) as i32)
        });

        let gray = (bc[0] as i32 + bc[1] as i32 + bc[2] as i32) / 3;

        bc.map(|c| clamp8((gray as f32 + (c as i32 - gray) as f32 * self.saturation) as i32))
    }
}

pub fn apply_bcs(rgb: [u8; 3], params: &ProcAmpParams) -> [u8; 3] {
    BcsAdjust::new(params).apply(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_samples() {
        assert_eq!(yuv_to_rgb(235, 128, 128), [255, 255, 255]);
        assert_eq!(yuv_to_rgb(128, 128, 128), [130, 130, 130]);
        assert_eq!(yuv_to_rgb(16, 128, 128), [0, 0, 0]);
    }

    #[test]
    fn test_out_of_studio_range_saturates() {
        assert_eq!(yuv_to_rgb(0, 128, 128), [0, 0, 0]);
        assert_eq!(yuv_to_rgb(255, 128, 128), [255, 255, 255]);
        // Strong red chroma overshoots R and undershoots B
        assert_eq!(yuv_to_rgb(82, 90, 240), [255, 1, 0]);
    }

    #[test]
    fn test_hue_achromatic_invariance() {
        for hue in 0..=255u8 {
            assert_eq!(apply_hue(128, 128, hue), (128, 128), "hue {}", hue);
        }
    }

    #[test]
    fn test_hue_neutral_is_identity() {
        for u in (0..=255u8).step_by(17) {
            for v in (0..=255u8).step_by(13) {
                assert_eq!(apply_hue(u, v, 128), (u, v));
            }
        }
    }

    #[test]
    fn test_hue_half_turn_flips_chroma() {
        // hue 0 is -pi: (u, v) offsets are negated
        assert_eq!(apply_hue(160, 100, 0), (96, 156));
    }

    #[test]
    fn test_hue_quarter_turn() {
        // hue 192 is +pi/2: u' = -v, v' = u
        assert_eq!(apply_hue(148, 128, 192), (128, 148));
    }

    #[test]
    fn test_bcs_neutral_is_identity() {
        let p = ProcAmpParams::NEUTRAL;
        for rgb in [[0, 0, 0], [255, 255, 255], [12, 200, 99], [130, 130, 130]] {
            assert_eq!(apply_bcs(rgb, &p), rgb);
        }
    }

    #[test]
    fn test_bcs_saturation_zero_collapses_to_gray() {
        let p = ProcAmpParams {
            saturation: 0,
            ..ProcAmpParams::NEUTRAL
        };
        let [r, g, b] = apply_bcs([200, 100, 30], &p);
        assert_eq!((r, g, b), (110, 110, 110));
    }

    #[test]
    fn test_bcs_contrast_zero_is_flat() {
        let p = ProcAmpParams {
            contrast: 0,
            ..ProcAmpParams::NEUTRAL
        };
        assert_eq!(apply_bcs([0, 77, 255], &p), [128, 128, 128]);
    }

    #[test]
    fn test_bcs_brightness_extremes() {
        let dark = ProcAmpParams {
            brightness: 0,
            ..ProcAmpParams::NEUTRAL
        };
        assert_eq!(apply_bcs([200, 255, 100], &dark), [0, 0, 0]);

        let bright = ProcAmpParams {
            brightness: 255,
            ..ProcAmpParams::NEUTRAL
        };
        assert_eq!(apply_bcs([10, 0, 1], &bright), [255, 253, 254]);
    }

    #[test]
    fn test_bcs_clamps_before_gray() {
        // Brightness clips R and G at 255 before the gray average is taken
        let p = ProcAmpParams {
            brightness: 192,
            saturation: 0,
            ..ProcAmpParams::NEUTRAL
        };
        // br = 127.5: 200 -> 255, 180 -> 255, 0 -> 127
        assert_eq!(apply_bcs([200, 180, 0], &p), [212, 212, 212]);
    }
}
