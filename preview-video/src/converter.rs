//! Frame converter for capture callbacks and render loops
//!
//! Wraps the stateless adapters with snapshot-buffer reuse and a drop-frame
//! policy: a bad frame is logged and counted, the pipeline keeps running.

use crate::error::Result;
use crate::format_conversion::convert_frame_with_scratch;
use crate::scratch_pool::{PoolStats, ScratchPool, DEFAULT_POOL_CAPACITY};
use crate::types::{BgraFrameMut, FrameDescriptor, ProcAmpParams};
use std::sync::atomic::{AtomicU64, Ordering};

/// Shareable converter; `&self` methods may run concurrently on disjoint
/// destination buffers.
pub struct FrameConverter {
    scratch: ScratchPool,

    // Statistics (atomic for lock-free reads)
    converted_frames: AtomicU64,
    dropped_frames: AtomicU64,
}

impl FrameConverter {
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// `capacity` bounds how many idle snapshot buffers are kept
    pub fn with_pool_capacity(capacity: usize) -> Self {
        FrameConverter {
            scratch: ScratchPool::new(capacity),
            converted_frames: AtomicU64::new(0),
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Convert one frame, surfacing any error to the caller
    pub fn convert(
        &self,
        src: &FrameDescriptor<'_>,
        dst: &mut BgraFrameMut<'_>,
        params: &ProcAmpParams,
    ) -> Result<()> {
        let mut scratch = self.scratch.acquire();
        let result = convert_frame_with_scratch(src, dst, params, &mut scratch);
        self.scratch.release(scratch);

        match &result {
            Ok(()) => self.converted_frames.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.dropped_frames.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    /// Convert one frame; on error log it, count it as dropped and return
    /// `false` so the caller can skip presenting it.
    pub fn convert_or_drop(
        &self,
        src: &FrameDescriptor<'_>,
        dst: &mut BgraFrameMut<'_>,
        params: &ProcAmpParams,
    ) -> bool {
        match self.convert(src, dst, params) {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "dropping {:?} frame {}x{}: {}",
                    src.pixel_format(),
                    src.width(),
                    src.height(),
                    e
                );
                false
            }
        }
    }

    pub fn stats(&self) -> ConverterStats {
        ConverterStats {
            converted_frames: self.converted_frames.load(Ordering::Relaxed),
            dropped_frames: self.dropped_frames.load(Ordering::Relaxed),
            scratch: self.scratch.stats(),
        }
    }
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConverterStats {
    pub converted_frames: u64,
    pub dropped_frames: u64,
    pub scratch: PoolStats,
}
