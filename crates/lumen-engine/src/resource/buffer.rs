use std::fmt;

use crate::backend::{BufferUsage, GpuBackend, NativeResource};
use crate::return_queue::ReturnNode;

/// A GPU buffer.
pub struct GpuBuffer<B: GpuBackend> {
    native: B::Buffer,
    size: usize,
    usage: BufferUsage,
}

impl<B: GpuBackend> GpuBuffer<B> {
    pub fn new(native: B::Buffer, size: usize, usage: BufferUsage) -> Self {
        Self { native, size, usage }
    }

    #[inline]
    pub fn native(&self) -> &B::Buffer {
        &self.native
    }

    /// Size in bytes as requested (the native allocation may be padded).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }
}

impl<B: GpuBackend> ReturnNode for GpuBuffer<B> {
    fn release_native(&mut self) {
        self.native.release();
    }
}

impl<B: GpuBackend> fmt::Debug for GpuBuffer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("native", &self.native)
            .field("size", &self.size)
            .field("usage", &self.usage)
            .finish()
    }
}
