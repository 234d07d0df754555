use std::sync::Arc;

use crate::backend::{BufferUsage, GpuBackend, PixelFormat};
use crate::geom::Rect;
use crate::key::ContentKey;
use crate::resource::Texture;
use crate::return_queue::Shared;

use super::{DefaultTextureProxy, GpuBufferProxy, TextureProxy};

/// Rasterized shape: either a triangle buffer or an alpha mask.
///
/// Which one materializes depends on what rasterization produced; the other
/// stays empty.
pub struct ShapeProxy<B: GpuBackend> {
    key: ContentKey,
    /// Device-space area the mask covers.
    draw_bounds: Rect,
    triangles: Arc<GpuBufferProxy<B>>,
    mask: Arc<DefaultTextureProxy<B>>,
}

impl<B: GpuBackend> ShapeProxy<B> {
    /// `draw_bounds` must be integral and non-empty.
    pub fn new(key: ContentKey, draw_bounds: Rect) -> Self {
        let width = draw_bounds.width() as u32;
        let height = draw_bounds.height() as u32;
        Self {
            triangles: Arc::new(GpuBufferProxy::new(key.clone(), 0, BufferUsage::Vertex)),
            mask: Arc::new(DefaultTextureProxy::new(key.clone(), width, height, PixelFormat::Alpha8, false)),
            key,
            draw_bounds,
        }
    }

    pub(crate) fn from_parts(
        key: ContentKey,
        draw_bounds: Rect,
        triangles: GpuBufferProxy<B>,
        mask: DefaultTextureProxy<B>,
    ) -> Self {
        Self {
            key,
            draw_bounds,
            triangles: Arc::new(triangles),
            mask: Arc::new(mask),
        }
    }

    #[inline]
    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    #[inline]
    pub fn draw_bounds(&self) -> Rect {
        self.draw_bounds
    }

    #[inline]
    pub fn triangles(&self) -> &Arc<GpuBufferProxy<B>> {
        &self.triangles
    }

    #[inline]
    pub fn mask(&self) -> &Arc<DefaultTextureProxy<B>> {
        &self.mask
    }

    pub fn is_instantiated(&self) -> bool {
        self.triangles.is_instantiated() || self.mask.is_instantiated()
    }

    /// Number of `x, y, coverage` vertices in the triangle buffer.
    pub fn vertex_count(&self) -> usize {
        self.triangles
            .get_buffer()
            .map_or(0, |b| b.size() / (3 * std::mem::size_of::<f32>()))
    }

    pub fn mask_texture(&self) -> Option<Shared<Texture<B>>> {
        self.mask.get_texture()
    }
}
