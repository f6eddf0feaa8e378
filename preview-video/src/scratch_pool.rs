//! Reusable snapshot buffers for the sharpen pass
//!
//! Concurrent conversions each take their own buffer, so no buffer is ever
//! shared between two in-flight frames.

use parking_lot::Mutex;

/// Buffers kept idle by default
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Free-list of byte buffers, bounded to `capacity` idle entries
pub struct ScratchPool {
    inner: Mutex<PoolInner>,
    capacity: usize,
}

struct PoolInner {
    idle: Vec<Vec<u8>>,
    allocated: usize,
    in_use: usize,
}

impl ScratchPool {
    pub fn new(capacity: usize) -> Self {
        ScratchPool {
            inner: Mutex::new(PoolInner {
                idle: Vec::with_capacity(capacity),
                allocated: 0,
                in_use: 0,
            }),
            capacity,
        }
    }

    /// Take an idle buffer, or a fresh empty one if none is left
    pub fn acquire(&self) -> Vec<u8> {
        let mut inner = self.inner.lock();
        inner.in_use += 1;

        match inner.idle.pop() {
            Some(buf) => buf,
            None => {
                inner.allocated += 1;
                log::debug!(
                    "scratch pool grew to {} buffers ({} in use)",
                    inner.allocated,
                    inner.in_use
                );
                Vec::new()
            }
        }
    }

    /// Return a buffer; surplus beyond `capacity` is freed
    pub fn release(&self, mut buf: Vec<u8>) {
        buf.clear();

        let mut inner = self.inner.lock();
        inner.in_use = inner.in_use.saturating_sub(1);

        if inner.idle.len() < self.capacity {
            inner.idle.push(buf);
        } else {
            inner.allocated = inner.allocated.saturating_sub(1);
        }
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock();

        PoolStats {
            capacity: self.capacity,
            idle: inner.idle.len(),
            in_use: inner.in_use,
            allocated: inner.allocated,
            idle_bytes: inner.idle.iter().map(Vec::capacity).sum(),
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        ScratchPool::new(DEFAULT_POOL_CAPACITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub idle: usize,
    pub in_use: usize,
    /// Live buffers, idle or handed out
    pub allocated: usize,
    pub idle_bytes: usize,
}
