//! Preview Video - capture frame conversion
//!
//! Turns NV12 / YUY2 capture frames into BGRA preview buffers with ProcAmp
//! adjustments, once per frame on the capture-to-display path.
//!
//! Pipeline per frame:
//! - Hue rotation of the shared chroma pair (skipped at 128)
//! - Integer BT.601 YUV to RGB
//! - Brightness/contrast then saturation in RGB (skipped when all at 128)
//! - 3x3 unsharp mask over the finished frame (skipped at 128)
//!
//! All entry points are synchronous and keep no state between calls; the
//! only allocation is the sharpen snapshot, which `FrameConverter` pools.

pub mod converter;
pub mod error;
pub mod format_conversion;
pub mod pixel_math;
pub mod scratch_pool;
pub mod sharpen;
pub mod types;

pub use converter::*;
pub use error::*;
pub use format_conversion::*;
pub use scratch_pool::*;
pub use sharpen::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface() {
        let luma = [235u8; 4];
        let chroma = [128u8; 2];
        let mut out = [0u8; 16];

        let src = FrameDescriptor::Nv12(Nv12Frame::packed(&luma, &chroma, 2, 2));
        assert_eq!(src.pixel_format(), PixelFormat::Nv12);

        convert_frame(
            &src,
            &mut BgraFrameMut::packed(&mut out, 2, 2),
            &ProcAmpParams::default(),
        )
        .unwrap();
        assert!(out.iter().all(|&b| b == 255));
    }
}
