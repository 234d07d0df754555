use std::sync::{Arc, OnceLock};

use crate::backend::{BufferUsage, GpuBackend};
use crate::key::ContentKey;
use crate::resource::GpuBuffer;
use crate::return_queue::Shared;

/// Proxy for a GPU buffer.
pub struct GpuBufferProxy<B: GpuBackend> {
    key: ContentKey,
    /// Declared size; 0 when only known once the content is produced.
    size: usize,
    usage: BufferUsage,
    buffer: OnceLock<Shared<GpuBuffer<B>>>,
}

impl<B: GpuBackend> GpuBufferProxy<B> {
    pub fn new(key: ContentKey, size: usize, usage: BufferUsage) -> Self {
        Self {
            key,
            size,
            usage,
            buffer: OnceLock::new(),
        }
    }

    pub fn instantiated(key: ContentKey, buffer: Shared<GpuBuffer<B>>) -> Self {
        let proxy = Self::new(key, buffer.size(), buffer.usage());
        let _ = proxy.buffer.set(buffer);
        proxy
    }

    #[inline]
    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    /// Size of the realized buffer, or the declared size before that.
    pub fn size(&self) -> usize {
        self.buffer.get().map_or(self.size, |b| b.size())
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn get_buffer(&self) -> Option<Shared<GpuBuffer<B>>> {
        self.buffer.get().cloned()
    }

    #[inline]
    pub fn is_instantiated(&self) -> bool {
        self.buffer.get().is_some()
    }

    pub(crate) fn bind(&self, buffer: Shared<GpuBuffer<B>>) -> bool {
        self.buffer.set(buffer).is_ok()
    }
}

/// A byte range inside a (possibly shared) vertex buffer.
pub struct VertexBufferView<B: GpuBackend> {
    proxy: Arc<GpuBufferProxy<B>>,
    offset: usize,
    size: usize,
}

impl<B: GpuBackend> VertexBufferView<B> {
    pub fn new(proxy: Arc<GpuBufferProxy<B>>, offset: usize, size: usize) -> Self {
        Self { proxy, offset, size }
    }

    #[inline]
    pub fn proxy(&self) -> &Arc<GpuBufferProxy<B>> {
        &self.proxy
    }

    /// Offset in bytes.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<B: GpuBackend> Clone for VertexBufferView<B> {
    fn clone(&self) -> Self {
        Self {
            proxy: Arc::clone(&self.proxy),
            offset: self.offset,
            size: self.size,
        }
    }
}
