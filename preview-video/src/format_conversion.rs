//! NV12 / YUY2 to BGRA conversion with ProcAmp adjustments
//!
//! Each adapter walks its plane layout in horizontal pixel pairs, runs the
//! shared chroma through the hue rotation, converts both pixels to RGB,
//! applies brightness/contrast/saturation, and writes BGRA rows in
//! increasing row order. The unsharp mask runs once over the finished frame.

use crate::error::{ConvertError, Result};
use crate::pixel_math::{yuv_to_rgb, BcsAdjust, HueRotation};
use crate::sharpen::sharpen_with_scratch;
use crate::types::{BgraFrameMut, Bgra, FrameDescriptor, Nv12Frame, ProcAmpParams, Yuy2Frame};

/// Per-frame pixel stages, built once from the parameters.
///
/// Stages at their neutral value are skipped entirely.
#[derive(Debug, Clone, Copy)]
struct PixelPipeline {
    hue: Option<HueRotation>,
    bcs: Option<BcsAdjust>,
}

impl PixelPipeline {
    fn new(params: &ProcAmpParams) -> Self {
        PixelPipeline {
            hue: params.hue_active().then(|| HueRotation::new(params.hue)),
            bcs: params.bcs_active().then(|| BcsAdjust::new(params)),
        }
    }

    #[inline(always)]
    fn chroma(&self, u: u8, v: u8) -> (u8, u8) {
        match &self.hue {
            Some(rotation) => rotation.rotate(u, v),
            None => (u, v),
        }
    }

    #[inline(always)]
    fn pixel(&self, y: u8, u: u8, v: u8) -> Bgra {
        let mut rgb = yuv_to_rgb(y, u, v);
        if let Some(bcs) = &self.bcs {
            rgb = bcs.apply(rgb);
        }
        let [r, g, b] = rgb;
        Bgra::opaque(r, g, b)
    }
}

fn check_geometry(src_width: usize, src_height: usize, dst: &BgraFrameMut<'_>) -> Result<()> {
    dst.check_constraints()?;
    if dst.width != src_width || dst.height != src_height {
        return Err(ConvertError::invalid(format!(
            "output is {}x{} but source is {}x{}",
            dst.width, dst.height, src_width, src_height
        )));
    }
    Ok(())
}

/// Convert an NV12 frame into `dst`, applying `params`.
///
/// Two consecutive luma rows share one chroma row; each luma pair `(i, i+1)`
/// shares the chroma pair at the same column offset.
pub fn convert_nv12(
    src: &Nv12Frame<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
) -> Result<()> {
    let mut scratch = Vec::new();
    convert_nv12_with_scratch(src, dst, params, &mut scratch)
}

/// [`convert_nv12`] with all controls neutral
pub fn convert_nv12_neutral(src: &Nv12Frame<'_>, dst: &mut BgraFrameMut<'_>) -> Result<()> {
    convert_nv12(src, dst, &ProcAmpParams::NEUTRAL)
}

pub(crate) fn convert_nv12_with_scratch(
    src: &Nv12Frame<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    src.check_constraints()?;
    check_geometry(src.width, src.height, dst)?;

    log::trace!("nv12 {}x{} -> bgra, {:?}", src.width, src.height, params);

    let pipeline = PixelPipeline::new(params);

    for j in 0..src.height {
        let y_row = src.luma_row(j);
        let uv_row = src.chroma_row(j);
        let out_row = dst.row_mut(j);

        for ((out, y), uv) in out_row
            .chunks_exact_mut(2)
            .zip(y_row.chunks_exact(2))
            .zip(uv_row.chunks_exact(2))
        {
            let (u, v) = pipeline.chroma(uv[0], uv[1]);
            out[0] = pipeline.pixel(y[0], u, v);
            out[1] = pipeline.pixel(y[1], u, v);
        }
    }

    if params.sharpen_active() {
        sharpen_with_scratch(dst, params.sharpness, scratch)?;
    }

    Ok(())
}

/// Convert a YUY2 frame into `dst`, applying `params`.
///
/// Every 4 source bytes `[Y0, U, Y1, V]` produce two output pixels sharing
/// `(U, V)`; there is no vertical chroma subsampling.
pub fn convert_yuy2(
    src: &Yuy2Frame<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
) -> Result<()> {
    let mut scratch = Vec::new();
    convert_yuy2_with_scratch(src, dst, params, &mut scratch)
}

/// [`convert_yuy2`] with all controls neutral
pub fn convert_yuy2_neutral(src: &Yuy2Frame<'_>, dst: &mut BgraFrameMut<'_>) -> Result<()> {
    convert_yuy2(src, dst, &ProcAmpParams::NEUTRAL)
}

pub(crate) fn convert_yuy2_with_scratch(
    src: &Yuy2Frame<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    src.check_constraints()?;
    check_geometry(src.width, src.height, dst)?;

    log::trace!("yuy2 {}x{} -> bgra, {:?}", src.width, src.height, params);

    let pipeline = PixelPipeline::new(params);

    for j in 0..src.height {
        let in_row = src.row(j);
        let out_row = dst.row_mut(j);

        for (out, yuyv) in out_row.chunks_exact_mut(2).zip(in_row.chunks_exact(4)) {
            let (u, v) = pipeline.chroma(yuyv[1], yuyv[3]);
            out[0] = pipeline.pixel(yuyv[0], u, v);
            out[1] = pipeline.pixel(yuyv[2], u, v);
        }
    }

    if params.sharpen_active() {
        sharpen_with_scratch(dst, params.sharpness, scratch)?;
    }

    Ok(())
}

/// Dispatch on the frame's pixel format
pub fn convert_frame(
    src: &FrameDescriptor<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
) -> Result<()> {
    let mut scratch = Vec::new();
    convert_frame_with_scratch(src, dst, params, &mut scratch)
}

pub(crate) fn convert_frame_with_scratch(
    src: &FrameDescriptor<'_>,
    dst: &mut BgraFrameMut<'_>,
    params: &ProcAmpParams,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    match src {
        FrameDescriptor::Nv12(frame) => convert_nv12_with_scratch(frame, dst, params, scratch),
        FrameDescriptor::Yuy2(frame) => convert_yuy2_with_scratch(frame, dst, params, scratch),
    }
}
