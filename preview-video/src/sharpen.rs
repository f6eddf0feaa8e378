//! 3x3 unsharp mask over a BGRA frame
//!
//! The filter reads neighbours and writes results into the same buffer, so
//! every pass first snapshots the frame and blurs from the snapshot only.

use crate::error::Result;
use crate::pixel_math::clamp8;
use crate::types::{BgraFrameMut, NEUTRAL};

/// Sharpen (`sharpness` > 128) or soften (< 128) a frame in place.
///
/// Allocates a snapshot for the duration of the call.
pub fn sharpen(frame: &mut BgraFrameMut<'_>, sharpness: u8) -> Result<()> {
    let mut scratch = Vec::new();
    sharpen_with_scratch(frame, sharpness, &mut scratch)
}

/// Same as [`sharpen`], snapshotting into a caller-owned buffer.
///
/// `scratch` is overwritten; its capacity is kept for reuse.
pub fn sharpen_with_scratch(
    frame: &mut BgraFrameMut<'_>,
    sharpness: u8,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    frame.check_constraints()?;
    if sharpness == NEUTRAL {
        return Ok(());
    }
    // No interior pixel to work with
    if frame.width <= 2 || frame.height <= 2 {
        return Ok(());
    }

    let (width, height, stride) = (frame.width, frame.height, frame.stride);
    let amount = (sharpness as f32 - 128.0) / 128.0;

    scratch.clear();
    scratch.extend_from_slice(&frame.data[..frame.span()]);
    let src: &[u8] = scratch;

    for y in 0..height {
        let rows = [y.saturating_sub(1), y, (y + 1).min(height - 1)];
        let dst_row = frame.row_mut(y);

        for (x, dst) in dst_row.iter_mut().enumerate() {
            let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];

            let mut sum = [0i32; 3];
            for &ry in &rows {
                let row = &src[ry * stride..];
                for &cx in &cols {
                    let px = &row[cx * 4..cx * 4 + 3];
                    sum[0] += px[0] as i32;
                    sum[1] += px[1] as i32;
                    sum[2] += px[2] as i32;
                }
            }

            let at = y * stride + x * 4;
            let orig = &src[at..at + 3];
            let mut out = [0u8; 3];
            for c in 0..3 {
                let blur = (sum[c] + 4) / 9;
                let o = orig[c] as i32;
                out[c] = clamp8((o as f32 + amount * (o - blur) as f32) as i32);
            }

            dst.b = out[0];
            dst.g = out[1];
            dst.r = out[2];
            dst.a = 255;
        }
    }

    Ok(())
}
