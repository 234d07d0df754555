use crate::geom::Rect;
use crate::key::ContentKey;

use super::ImageBuffer;

/// Result of rasterizing a shape: either triangles or a coverage mask.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeBuffer {
    /// Interleaved `x, y, coverage` triangle vertices.
    Triangles(Vec<f32>),
    /// Alpha-only mask covering the shape's draw bounds.
    Mask(ImageBuffer),
}

/// Vector content rasterized by the engine's external geometry layer.
pub trait Shape: Send + Sync {
    /// Writes the words identifying this shape's geometry. Writing nothing
    /// marks the shape uncacheable.
    fn write_key(&self, key: &mut ContentKey);

    /// Inverse fills cover everything outside the path, so their result
    /// depends on the clip.
    fn is_inverse_fill(&self) -> bool {
        false
    }

    fn bounds(&self) -> Rect;

    /// Rasterizes within `bounds`: the clip for inverse fills, the shape's
    /// own rounded-out bounds otherwise. The result is cached under the
    /// shape's key and reused for any later clip.
    fn rasterize(&self, antialias: bool, bounds: Rect) -> Option<ShapeBuffer>;
}
