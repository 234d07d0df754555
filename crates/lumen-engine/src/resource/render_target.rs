use std::fmt;

use crate::backend::{GpuBackend, NativeResource};
use crate::return_queue::{ReturnNode, Shared};

use super::Texture;

/// A colour attachment, optionally with a multisampled companion texture.
///
/// Draws go to the MSAA texture when present and resolve into `texture`.
pub struct RenderTarget<B: GpuBackend> {
    texture: Shared<Texture<B>>,
    msaa: Option<B::Texture>,
    sample_count: u32,
}

impl<B: GpuBackend> RenderTarget<B> {
    pub fn new(texture: Shared<Texture<B>>, msaa: Option<B::Texture>, sample_count: u32) -> Self {
        Self {
            texture,
            msaa,
            sample_count: sample_count.max(1),
        }
    }

    #[inline]
    pub fn texture(&self) -> &Shared<Texture<B>> {
        &self.texture
    }

    #[inline]
    pub fn msaa_texture(&self) -> Option<&B::Texture> {
        self.msaa.as_ref()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    pub fn externally_owned(&self) -> bool {
        self.texture.externally_owned()
    }
}

impl<B: GpuBackend> ReturnNode for RenderTarget<B> {
    fn release_native(&mut self) {
        // The colour texture goes through its own handle.
        if let Some(msaa) = self.msaa.take() {
            msaa.release();
        }
    }
}

impl<B: GpuBackend> fmt::Debug for RenderTarget<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTarget")
            .field("texture", &self.texture)
            .field("sample_count", &self.sample_count)
            .field("msaa", &self.msaa.is_some())
            .finish()
    }
}
