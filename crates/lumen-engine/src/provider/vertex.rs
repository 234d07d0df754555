use std::sync::Arc;

use crate::backend::{BufferUsage, GpuBackend};
use crate::key::ContentKey;
use crate::proxy::GpuBufferProxy;
use crate::source::VertexProvider;

/// Accumulator packing small vertex providers into one buffer per block.
///
/// Written only by the thread that records draws.
pub(crate) struct SharedVertexBlock<B: GpuBackend> {
    proxy: Option<Arc<GpuBufferProxy<B>>>,
    vertices: Vec<f32>,
    capacity: usize,
    frame_usage: usize,
    running_max: usize,
}

impl<B: GpuBackend> SharedVertexBlock<B> {
    pub(crate) fn new() -> Self {
        Self {
            proxy: None,
            vertices: Vec::new(),
            capacity: 0,
            frame_usage: 0,
            running_max: 0,
        }
    }

    /// Float capacity for the next block: the largest frame seen so far,
    /// bounded by `[min, max]`.
    pub(crate) fn block_size(&self, min: usize, max: usize) -> usize {
        self.running_max.max(min).min(max).max(1)
    }

    pub(crate) fn fits(&self, count: usize) -> bool {
        self.proxy.is_some() && self.vertices.len() + count <= self.capacity
    }

    pub(crate) fn start(&mut self, capacity: usize) {
        debug_assert!(self.proxy.is_none(), "previous block was not taken");
        self.proxy = Some(Arc::new(GpuBufferProxy::new(ContentKey::new(), 0, BufferUsage::Vertex)));
        self.vertices = Vec::with_capacity(capacity);
        self.capacity = capacity;
    }

    /// Writes `count` floats from `provider` into the current block and
    /// returns the block proxy with the float offset of the written range.
    pub(crate) fn append(&mut self, provider: &dyn VertexProvider, count: usize) -> Option<(Arc<GpuBufferProxy<B>>, usize)> {
        let proxy = self.proxy.clone()?;
        let offset = self.vertices.len();
        self.vertices.resize(offset + count, 0.0);
        provider.get_vertices(&mut self.vertices[offset..]);
        self.frame_usage += count;
        Some((proxy, offset))
    }

    /// Detaches the current block.
    pub(crate) fn take(&mut self) -> Option<(Arc<GpuBufferProxy<B>>, Vec<f32>)> {
        let proxy = self.proxy.take()?;
        self.capacity = 0;
        Some((proxy, std::mem::take(&mut self.vertices)))
    }

    /// Resets the allocator for a new frame. Returns the discarded float
    /// count of a block that was never flushed.
    pub(crate) fn end_frame(&mut self) -> usize {
        self.running_max = self.running_max.max(self.frame_usage);
        self.frame_usage = 0;
        self.take().map_or(0, |(_, vertices)| vertices.len())
    }
}
