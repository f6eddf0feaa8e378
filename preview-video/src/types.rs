//! Frame views, pixel formats and ProcAmp parameters

use crate::error::{ConvertError, Result};
use bytemuck::{Pod, Zeroable};

/// Neutral value shared by all five ProcAmp controls
pub const NEUTRAL: u8 = 128;

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// Capture pixel formats accepted by the converter
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Nv12 = fourcc(b"NV12"), // Semi-planar YUV 4:2:0 (Y plane, interleaved UV)
    Yuy2 = fourcc(b"YUY2"), // Packed YUV 4:2:2 [Y0 U Y1 V]
}

impl PixelFormat {
    /// Map a little-endian FourCC code to a supported format
    pub fn from_fourcc(code: u32) -> Result<Self> {
        match code {
            c if c == PixelFormat::Nv12 as u32 => Ok(PixelFormat::Nv12),
            c if c == PixelFormat::Yuy2 as u32 => Ok(PixelFormat::Yuy2),
            other => Err(ConvertError::UnsupportedFormat(other)),
        }
    }

    pub fn fourcc(self) -> u32 {
        self as u32
    }

    /// Number of planes the capture device hands over
    pub fn plane_count(self) -> usize {
        match self {
            PixelFormat::Nv12 => 2,
            PixelFormat::Yuy2 => 1,
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = ConvertError;

    fn try_from(code: u32) -> Result<Self> {
        PixelFormat::from_fourcc(code)
    }
}

/// ProcAmp controls, 0..=255 each with 128 as identity.
///
/// Owned by the caller and only borrowed for the duration of one conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ProcAmpParams {
    pub brightness: u8,
    pub contrast: u8,
    pub hue: u8,
    pub saturation: u8,
    pub sharpness: u8,
}

impl ProcAmpParams {
    pub const NEUTRAL: ProcAmpParams = ProcAmpParams {
        brightness: NEUTRAL,
        contrast: NEUTRAL,
        hue: NEUTRAL,
        saturation: NEUTRAL,
        sharpness: NEUTRAL,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// Hue rotation only runs when the control is off-center
    pub fn hue_active(&self) -> bool {
        self.hue != NEUTRAL
    }

    /// Brightness, contrast and saturation share one RGB pass
    pub fn bcs_active(&self) -> bool {
        self.brightness != NEUTRAL || self.contrast != NEUTRAL || self.saturation != NEUTRAL
    }

    pub fn sharpen_active(&self) -> bool {
        self.sharpness != NEUTRAL
    }
}

impl Default for ProcAmpParams {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// One output pixel, byte order B, G, R, A
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Bgra { b, g, r, a: 255 }
    }
}

/// Bytes a plane must span: every row but the last at full stride, the last
/// row only up to its tight size.
pub fn plane_len(stride: usize, row_bytes: usize, rows: usize) -> Result<usize> {
    if rows == 0 {
        return Ok(0);
    }
    (rows - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(row_bytes))
        .ok_or_else(|| ConvertError::invalid("plane size overflows usize"))
}

/// Tight row size in bytes for `width` pixels of `bytes_per_pixel` each
pub fn row_bytes(width: usize, bytes_per_pixel: usize) -> Result<usize> {
    width
        .checked_mul(bytes_per_pixel)
        .ok_or_else(|| ConvertError::invalid(format!("row of {width} pixels overflows usize")))
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ConvertError::invalid(format!(
            "frame dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Pixel pairs and 2x2 chroma blocks need even dimensions
fn check_even_dimensions(width: usize, height: usize) -> Result<()> {
    check_dimensions(width, height)?;
    if width % 2 != 0 || height % 2 != 0 {
        return Err(ConvertError::invalid(format!(
            "frame dimensions must be even, got {width}x{height}"
        )));
    }
    Ok(())
}

fn check_plane(
    name: &str,
    plane: usize,
    stride: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<()> {
    if stride < row_bytes {
        return Err(ConvertError::invalid(format!(
            "{name} stride {stride} is smaller than row size {row_bytes}"
        )));
    }
    let needed = plane_len(stride, row_bytes, rows)?;
    if plane < needed {
        return Err(ConvertError::invalid(format!(
            "{name} plane holds {plane} bytes, at least {needed} required"
        )));
    }
    Ok(())
}

/// Borrowed NV12 frame: full-resolution luma plus half-height interleaved UV
#[derive(Debug, Clone, Copy)]
pub struct Nv12Frame<'a> {
    pub luma: &'a [u8],
    /// Bytes per luma row
    pub luma_stride: usize,
    pub chroma: &'a [u8],
    /// Bytes per chroma row
    pub chroma_stride: usize,
    pub width: usize,
    pub height: usize,
}

impl<'a> Nv12Frame<'a> {
    /// Frame with tight strides (both planes `width` bytes per row)
    pub fn packed(luma: &'a [u8], chroma: &'a [u8], width: usize, height: usize) -> Self {
        Nv12Frame {
            luma,
            luma_stride: width,
            chroma,
            chroma_stride: width,
            width,
            height,
        }
    }

    pub fn check_constraints(&self) -> Result<()> {
        check_even_dimensions(self.width, self.height)?;
        check_plane("luma", self.luma.len(), self.luma_stride, self.width, self.height)?;
        check_plane(
            "chroma",
            self.chroma.len(),
            self.chroma_stride,
            self.width,
            self.height / 2,
        )?;
        Ok(())
    }

    /// Luma row `j`, exactly `width` samples
    pub(crate) fn luma_row(&self, j: usize) -> &'a [u8] {
        let start = j * self.luma_stride;
        &self.luma[start..start + self.width]
    }

    /// Chroma row shared by luma rows `j` and `j ^ 1`
    pub(crate) fn chroma_row(&self, j: usize) -> &'a [u8] {
        let start = (j / 2) * self.chroma_stride;
        &self.chroma[start..start + self.width]
    }
}

/// Borrowed YUY2 frame, 4 bytes per pixel pair
#[derive(Debug, Clone, Copy)]
pub struct Yuy2Frame<'a> {
    pub data: &'a [u8],
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl<'a> Yuy2Frame<'a> {
    pub fn packed(data: &'a [u8], width: usize, height: usize) -> Self {
        Yuy2Frame {
            data,
            stride: width.saturating_mul(2),
            width,
            height,
        }
    }

    pub fn check_constraints(&self) -> Result<()> {
        check_even_dimensions(self.width, self.height)?;
        check_plane(
            "yuy2",
            self.data.len(),
            self.stride,
            row_bytes(self.width, 2)?,
            self.height,
        )
    }

    pub(crate) fn row(&self, j: usize) -> &'a [u8] {
        let start = j * self.stride;
        &self.data[start..start + self.width * 2]
    }
}

/// A captured frame in one of the supported layouts
#[derive(Debug, Clone, Copy)]
pub enum FrameDescriptor<'a> {
    Nv12(Nv12Frame<'a>),
    Yuy2(Yuy2Frame<'a>),
}

impl FrameDescriptor<'_> {
    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            FrameDescriptor::Nv12(_) => PixelFormat::Nv12,
            FrameDescriptor::Yuy2(_) => PixelFormat::Yuy2,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            FrameDescriptor::Nv12(f) => f.width,
            FrameDescriptor::Yuy2(f) => f.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            FrameDescriptor::Nv12(f) => f.height,
            FrameDescriptor::Yuy2(f) => f.height,
        }
    }

    pub fn check_constraints(&self) -> Result<()> {
        match self {
            FrameDescriptor::Nv12(f) => f.check_constraints(),
            FrameDescriptor::Yuy2(f) => f.check_constraints(),
        }
    }
}

/// Caller-owned BGRA destination
#[derive(Debug)]
pub struct BgraFrameMut<'a> {
    pub data: &'a mut [u8],
    /// Bytes per output row, at least `width * 4`
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl<'a> BgraFrameMut<'a> {
    pub fn packed(data: &'a mut [u8], width: usize, height: usize) -> Self {
        BgraFrameMut {
            data,
            stride: width.saturating_mul(4),
            width,
            height,
        }
    }

    /// Minimum buffer length for the given geometry
    pub fn required_len(width: usize, height: usize, stride: usize) -> Result<usize> {
        plane_len(stride, row_bytes(width, 4)?, height)
    }

    pub fn check_constraints(&self) -> Result<()> {
        check_dimensions(self.width, self.height)?;
        check_plane(
            "output",
            self.data.len(),
            self.stride,
            row_bytes(self.width, 4)?,
            self.height,
        )
    }

    /// Bytes covered by the frame, padding after the last row excluded
    pub(crate) fn span(&self) -> usize {
        (self.height - 1) * self.stride + self.width * 4
    }

    pub fn row(&self, j: usize) -> &[Bgra] {
        let start = j * self.stride;
        bytemuck::cast_slice(&self.data[start..start + self.width * 4])
    }

    pub fn row_mut(&mut self, j: usize) -> &mut [Bgra] {
        let start = j * self.stride;
        bytemuck::cast_slice_mut(&mut self.data[start..start + self.width * 4])
    }

    pub fn pixel(&self, x: usize, y: usize) -> Bgra {
        self.row(y)[x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_mapping() {
        assert_eq!(PixelFormat::from_fourcc(0x3231_564E), Ok(PixelFormat::Nv12));
        assert_eq!(PixelFormat::from_fourcc(0x3259_5559), Ok(PixelFormat::Yuy2));
        assert_eq!(
            PixelFormat::try_from(u32::from_le_bytes(*b"UYVY")),
            Err(ConvertError::UnsupportedFormat(u32::from_le_bytes(*b"UYVY")))
        );
        assert_eq!(PixelFormat::Nv12.plane_count(), 2);
        assert_eq!(PixelFormat::Yuy2.plane_count(), 1);
    }

    #[test]
    fn test_procamp_defaults() {
        let p = ProcAmpParams::default();
        assert!(p.is_neutral());
        assert!(!p.hue_active() && !p.bcs_active() && !p.sharpen_active());

        let p = ProcAmpParams { saturation: 0, ..p };
        assert!(p.bcs_active());
        assert!(!p.hue_active());
    }

    #[test]
    fn test_plane_len() {
        assert_eq!(plane_len(64, 48, 4).unwrap(), 3 * 64 + 48);
        assert_eq!(plane_len(64, 48, 0).unwrap(), 0);
        assert!(plane_len(usize::MAX, 4, 3).is_err());
    }

    #[test]
    fn test_nv12_constraints() {
        let luma = vec![0u8; 16 * 4];
        let chroma = vec![0u8; 16 * 2];
        assert!(Nv12Frame::packed(&luma, &chroma, 16, 4).check_constraints().is_ok());

        // Odd width
        assert!(Nv12Frame::packed(&luma, &chroma, 15, 4).check_constraints().is_err());

        // Short chroma plane
        let frame = Nv12Frame::packed(&luma, &chroma[..31], 16, 4);
        assert!(matches!(
            frame.check_constraints(),
            Err(ConvertError::InvalidArgument(_))
        ));

        // Stride below the tight row size
        let frame = Nv12Frame {
            luma_stride: 8,
            ..Nv12Frame::packed(&luma, &chroma, 16, 4)
        };
        assert!(frame.check_constraints().is_err());
    }

    #[test]
    fn test_padded_stride_accepts_short_last_row() {
        // 4x2 YUY2 with 12-byte stride: last row only needs 8 bytes
        let data = vec![0u8; 12 + 8];
        let frame = Yuy2Frame {
            data: &data,
            stride: 12,
            width: 4,
            height: 2,
        };
        assert!(frame.check_constraints().is_ok());
    }

    #[test]
    fn test_bgra_rows() {
        let mut buf = vec![0u8; 2 * 12];
        let mut out = BgraFrameMut {
            data: &mut buf,
            stride: 12,
            width: 2,
            height: 2,
        };
        assert!(out.check_constraints().is_ok());
        out.row_mut(1)[1] = Bgra::opaque(1, 2, 3);
        assert_eq!(out.pixel(1, 1), Bgra { b: 3, g: 2, r: 1, a: 255 });
        assert_eq!(&buf[16..20], &[3, 2, 1, 255]);
    }

    #[test]
    fn test_row_size_overflow_rejected() {
        let huge = usize::MAX / 2 + 1;
        assert!(row_bytes(huge, 2).is_err());
        assert!(BgraFrameMut::required_len(huge, 2, usize::MAX).is_err());

        let data = [0u8; 16];
        let frame = Yuy2Frame {
            data: &data,
            stride: 8,
            width: huge,
            height: 2,
        };
        assert!(matches!(
            frame.check_constraints(),
            Err(ConvertError::InvalidArgument(_))
        ));

        let mut buf = [0u8; 16];
        let out = BgraFrameMut {
            data: &mut buf,
            stride: 8,
            width: usize::MAX / 4 + 1,
            height: 2,
        };
        assert!(out.check_constraints().is_err());
    }

    #[test]
    fn test_zero_sized_output_rejected() {
        let mut buf = vec![];
        let out = BgraFrameMut::packed(&mut buf, 0, 0);
        assert!(out.check_constraints().is_err());
    }
}
