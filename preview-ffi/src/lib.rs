//! Preview FFI - C Foreign Function Interface
//!
//! C-compatible API for capture applications that hand over raw plane
//! pointers and strides. Every entry point validates its arguments and
//! returns a status code; nothing unwinds across the boundary.

use libc::{c_char, c_int};
use std::slice;

use bytemuck::{Pod, Zeroable};
use preview_video::{
    convert_frame, plane_len, row_bytes, BgraFrameMut, ConvertError, FrameDescriptor, Nv12Frame,
    PixelFormat, ProcAmpParams, Yuy2Frame,
};

/// Conversion succeeded
pub const PREVIEW_OK: c_int = 0;
/// Null pointer, bad dimension or short stride
pub const PREVIEW_ERR_INVALID_ARGUMENT: c_int = -1;
/// Pixel format is neither NV12 nor YUY2
pub const PREVIEW_ERR_UNSUPPORTED_FORMAT: c_int = -2;

/// C-compatible ProcAmp parameters, 0..255 each, 128 neutral
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CProcAmpParams {
    pub brightness: u8,
    pub contrast: u8,
    pub hue: u8,
    pub saturation: u8,
    pub sharpness: u8,
}

/// C-compatible captured frame description
///
/// `planes[1]` / `strides[1]` are only read for NV12.
#[repr(C)]
pub struct CFrameDescriptor {
    /// Little-endian FourCC ('NV12' or 'YUY2')
    pub fourcc: u32,
    pub width: u32,
    pub height: u32,
    pub planes: [*const u8; 2],
    pub strides: [u32; 2],
}

/// C-compatible BGRA destination
#[repr(C)]
pub struct COutputBuffer {
    pub data: *mut u8,
    pub stride: u32,
}

fn status(result: Result<(), ConvertError>) -> c_int {
    match result {
        Ok(()) => PREVIEW_OK,
        Err(e) => {
            log::warn!("frame conversion failed: {}", e);
            match e {
                ConvertError::InvalidArgument(_) => PREVIEW_ERR_INVALID_ARGUMENT,
                ConvertError::UnsupportedFormat(_) => PREVIEW_ERR_UNSUPPORTED_FORMAT,
            }
        }
    }
}

/// Borrow `rows` rows of a caller plane. Validates stride and null before
/// any slice is formed.
///
/// # Safety
/// `ptr` must be valid for reads of the computed length.
unsafe fn plane<'a>(
    ptr: *const u8,
    stride: u32,
    row_bytes: usize,
    rows: usize,
    name: &str,
) -> Result<&'a [u8], ConvertError> {
    if ptr.is_null() {
        return Err(ConvertError::InvalidArgument(format!("{name} plane is null")));
    }
    let stride = stride as usize;
    if stride < row_bytes {
        return Err(ConvertError::InvalidArgument(format!(
            "{name} stride {stride} is smaller than row size {row_bytes}"
        )));
    }
    let len = plane_len(stride, row_bytes, rows)?;
    Ok(slice::from_raw_parts(ptr, len))
}

/// # Safety
/// `out.data` must be valid for writes of the computed length.
unsafe fn output<'a>(
    out: &COutputBuffer,
    width: usize,
    height: usize,
) -> Result<BgraFrameMut<'a>, ConvertError> {
    if out.data.is_null() {
        return Err(ConvertError::InvalidArgument("output buffer is null".into()));
    }
    let stride = out.stride as usize;
    let row = row_bytes(width, 4)?;
    if stride < row {
        return Err(ConvertError::InvalidArgument(format!(
            "output stride {stride} is smaller than row size {row}"
        )));
    }
    let len = BgraFrameMut::required_len(width, height, stride)?;
    Ok(BgraFrameMut {
        data: slice::from_raw_parts_mut(out.data, len),
        stride,
        width,
        height,
    })
}

fn check_size(width: u32, height: u32) -> Result<(usize, usize), ConvertError> {
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidArgument(format!(
            "frame dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok((width as usize, height as usize))
}

/// # Safety
/// Plane pointers must be valid for the geometry the descriptor states.
unsafe fn descriptor<'a>(desc: &CFrameDescriptor) -> Result<FrameDescriptor<'a>, ConvertError> {
    let format = PixelFormat::from_fourcc(desc.fourcc)?;
    let (width, height) = check_size(desc.width, desc.height)?;

    Ok(match format {
        PixelFormat::Nv12 => FrameDescriptor::Nv12(Nv12Frame {
            luma: plane(desc.planes[0], desc.strides[0], width, height, "luma")?,
            luma_stride: desc.strides[0] as usize,
            chroma: plane(desc.planes[1], desc.strides[1], width, height / 2, "chroma")?,
            chroma_stride: desc.strides[1] as usize,
            width,
            height,
        }),
        PixelFormat::Yuy2 => FrameDescriptor::Yuy2(Yuy2Frame {
            data: plane(
                desc.planes[0],
                desc.strides[0],
                row_bytes(width, 2)?,
                height,
                "yuy2",
            )?,
            stride: desc.strides[0] as usize,
            width,
            height,
        }),
    })
}

fn params_or_neutral(params: *const CProcAmpParams) -> ProcAmpParams {
    if params.is_null() {
        ProcAmpParams::NEUTRAL
    } else {
        // SAFETY: non-null and caller-owned for the duration of the call
        bytemuck::cast(unsafe { *params })
    }
}

unsafe fn convert_desc(
    desc: &CFrameDescriptor,
    out: &COutputBuffer,
    params: &ProcAmpParams,
) -> Result<(), ConvertError> {
    let src = descriptor(desc)?;
    let mut dst = output(out, src.width(), src.height())?;
    convert_frame(&src, &mut dst, params)
}

// ============================================================================
// FORMAT CONVERSION API
// ============================================================================

/// Fill `params_out` with the neutral ProcAmp set (all 128)
///
/// # Safety
/// `params_out` must be null or point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn preview_procamp_neutral(params_out: *mut CProcAmpParams) -> c_int {
    if params_out.is_null() {
        return PREVIEW_ERR_INVALID_ARGUMENT;
    }
    *params_out = bytemuck::cast(ProcAmpParams::NEUTRAL);
    PREVIEW_OK
}

/// Convert any supported captured frame, dispatching on its FourCC.
/// A null `params` means neutral.
///
/// # Safety
/// `desc` and `out` must be valid; planes and output must cover the stated
/// geometry.
#[no_mangle]
pub unsafe extern "C" fn preview_convert_frame(
    desc: *const CFrameDescriptor,
    out: *const COutputBuffer,
    params: *const CProcAmpParams,
) -> c_int {
    if desc.is_null() || out.is_null() {
        return status(Err(ConvertError::InvalidArgument(
            "descriptor or output is null".into(),
        )));
    }
    status(convert_desc(&*desc, &*out, &params_or_neutral(params)))
}

/// NV12 to BGRA with all controls neutral
///
/// # Safety
/// Plane and output pointers must cover `height` rows at their strides.
#[no_mangle]
pub unsafe extern "C" fn preview_convert_nv12(
    y: *const u8,
    uv: *const u8,
    width: u32,
    height: u32,
    y_stride: u32,
    uv_stride: u32,
    out: *mut u8,
    out_stride: u32,
) -> c_int {
    preview_convert_nv12_procamp(
        y,
        uv,
        width,
        height,
        y_stride,
        uv_stride,
        out,
        out_stride,
        std::ptr::null(),
    )
}

/// NV12 to BGRA with ProcAmp adjustments
///
/// # Safety
/// Plane and output pointers must cover `height` rows at their strides.
#[no_mangle]
pub unsafe extern "C" fn preview_convert_nv12_procamp(
    y: *const u8,
    uv: *const u8,
    width: u32,
    height: u32,
    y_stride: u32,
    uv_stride: u32,
    out: *mut u8,
    out_stride: u32,
    params: *const CProcAmpParams,
) -> c_int {
    let desc = CFrameDescriptor {
        fourcc: PixelFormat::Nv12.fourcc(),
        width,
        height,
        planes: [y, uv],
        strides: [y_stride, uv_stride],
    };
    let out = COutputBuffer {
        data: out,
        stride: out_stride,
    };
    status(convert_desc(&desc, &out, &params_or_neutral(params)))
}

/// YUY2 to BGRA with all controls neutral
///
/// # Safety
/// Source and output pointers must cover `height` rows at their strides.
#[no_mangle]
pub unsafe extern "C" fn preview_convert_yuy2(
    yuy2: *const u8,
    width: u32,
    height: u32,
    yuy2_stride: u32,
    out: *mut u8,
    out_stride: u32,
) -> c_int {
    preview_convert_yuy2_procamp(
        yuy2,
        width,
        height,
        yuy2_stride,
        out,
        out_stride,
        std::ptr::null(),
    )
}

/// YUY2 to BGRA with ProcAmp adjustments
///
/// # Safety
/// Source and output pointers must cover `height` rows at their strides.
#[no_mangle]
pub unsafe extern "C" fn preview_convert_yuy2_procamp(
    yuy2: *const u8,
    width: u32,
    height: u32,
    yuy2_stride: u32,
    out: *mut u8,
    out_stride: u32,
    params: *const CProcAmpParams,
) -> c_int {
    let desc = CFrameDescriptor {
        fourcc: PixelFormat::Yuy2.fourcc(),
        width,
        height,
        planes: [yuy2, std::ptr::null()],
        strides: [yuy2_stride, 0],
    };
    let out = COutputBuffer {
        data: out,
        stride: out_stride,
    };
    status(convert_desc(&desc, &out, &params_or_neutral(params)))
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Human-readable text for a status code
#[no_mangle]
pub extern "C" fn preview_status_str(code: c_int) -> *const c_char {
    let text: &'static str = match code {
        PREVIEW_OK => "ok\0",
        PREVIEW_ERR_INVALID_ARGUMENT => "invalid argument\0",
        PREVIEW_ERR_UNSUPPORTED_FORMAT => "unsupported format\0",
        _ => "unknown status\0",
    };
    text.as_ptr() as *const c_char
}

/// Get library version string
#[no_mangle]
pub extern "C" fn preview_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    #[test]
    fn test_nv12_ffi_white() {
        let y = [235u8; 8];
        let uv = [128u8; 4];
        let mut out = [0u8; 32];

        let rc = unsafe {
            preview_convert_nv12(y.as_ptr(), uv.as_ptr(), 4, 2, 4, 4, out.as_mut_ptr(), 16)
        };

        assert_eq!(rc, PREVIEW_OK);
        assert!(out.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_yuy2_ffi_procamp() {
        let src = [128u8; 4 * 2 * 2];
        let mut out = [0u8; 4 * 2 * 4];
        let mut params = CProcAmpParams::zeroed();
        unsafe {
            assert_eq!(preview_procamp_neutral(&mut params), PREVIEW_OK);
        }
        params.saturation = 0;
        params.brightness = 0;

        let rc = unsafe {
            preview_convert_yuy2_procamp(src.as_ptr(), 4, 2, 8, out.as_mut_ptr(), 16, &params)
        };

        assert_eq!(rc, PREVIEW_OK);
        for px in out.chunks_exact(4) {
            assert_eq!(px, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_neutral_wrapper_matches_null_params() {
        let src: Vec<u8> = (0..8 * 2 * 4).map(|i| (i * 29 % 256) as u8).collect();
        let mut a = vec![0u8; 8 * 4 * 4];
        let mut b = vec![0u8; 8 * 4 * 4];
        let neutral = CProcAmpParams {
            brightness: 128,
            contrast: 128,
            hue: 128,
            saturation: 128,
            sharpness: 128,
        };

        unsafe {
            preview_convert_yuy2(src.as_ptr(), 8, 4, 16, a.as_mut_ptr(), 32);
            preview_convert_yuy2_procamp(src.as_ptr(), 8, 4, 16, b.as_mut_ptr(), 32, &neutral);
        }

        assert_eq!(a, b);
    }

    #[test]
    fn test_null_and_bad_arguments() {
        let y = [0u8; 16];
        let mut out = [0u8; 32];

        let rc = unsafe {
            preview_convert_nv12(y.as_ptr(), ptr::null(), 4, 2, 4, 4, out.as_mut_ptr(), 16)
        };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        let rc = unsafe { preview_convert_yuy2(y.as_ptr(), 4, 2, 8, ptr::null_mut(), 16) };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        // Source stride shorter than width * 2
        let rc = unsafe { preview_convert_yuy2(y.as_ptr(), 4, 1, 4, out.as_mut_ptr(), 16) };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        // Zero height
        let rc = unsafe { preview_convert_yuy2(y.as_ptr(), 4, 0, 8, out.as_mut_ptr(), 16) };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        // Odd width
        let rc = unsafe { preview_convert_yuy2(y.as_ptr(), 3, 2, 6, out.as_mut_ptr(), 12) };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frame_dispatch_and_unsupported_format() {
        let src = [128u8; 2 * 2 * 2];
        let mut out = [0u8; 2 * 2 * 4];
        let dst = COutputBuffer {
            data: out.as_mut_ptr(),
            stride: 8,
        };

        let mut desc = CFrameDescriptor {
            fourcc: u32::from_le_bytes(*b"YUY2"),
            width: 2,
            height: 2,
            planes: [src.as_ptr(), ptr::null()],
            strides: [4, 0],
        };
        let rc = unsafe { preview_convert_frame(&desc, &dst, ptr::null()) };
        assert_eq!(rc, PREVIEW_OK);

        desc.fourcc = u32::from_le_bytes(*b"UYVY");
        let rc = unsafe { preview_convert_frame(&desc, &dst, ptr::null()) };
        assert_eq!(rc, PREVIEW_ERR_UNSUPPORTED_FORMAT);

        let rc = unsafe { preview_convert_frame(ptr::null(), &dst, ptr::null()) };
        assert_eq!(rc, PREVIEW_ERR_INVALID_ARGUMENT);

        assert_eq!(&out[..4], &[130, 130, 130, 255]);
    }

    #[test]
    fn test_status_strings() {
        let text = |code| unsafe { CStr::from_ptr(preview_status_str(code)) }.to_str().unwrap();
        assert_eq!(text(PREVIEW_OK), "ok");
        assert_eq!(text(PREVIEW_ERR_UNSUPPORTED_FORMAT), "unsupported format");
        assert_eq!(text(42), "unknown status");
    }

    #[test]
    fn test_version() {
        unsafe {
            let version = preview_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, "0.1.0");
        }
    }
}
