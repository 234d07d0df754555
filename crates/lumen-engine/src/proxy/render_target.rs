use std::sync::{Arc, OnceLock};

use crate::backend::{GpuBackend, ImageOrigin, PixelFormat};
use crate::key::ContentKey;
use crate::resource::{RenderTarget, Texture};
use crate::return_queue::Shared;

use super::TextureProxy;

/// Render-target role of a proxy.
pub trait RenderTargetProxy<B: GpuBackend>: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn format(&self) -> PixelFormat;

    fn origin(&self) -> ImageOrigin;

    /// Effective sample count, already clamped to what the device supports.
    fn sample_count(&self) -> u32;

    /// Window-system targets are never destroyed by the engine.
    fn externally_owned(&self) -> bool;

    fn get_render_target(&self) -> Option<Shared<RenderTarget<B>>>;

    /// Returns the texture role of the same object, if it has one.
    fn as_texture_proxy(self: Arc<Self>) -> Option<Arc<dyn TextureProxy<B>>>;
}

/// Offscreen render target that can also be sampled as a texture.
pub struct TextureRenderTargetProxy<B: GpuBackend> {
    key: ContentKey,
    width: u32,
    height: u32,
    backing_width: u32,
    backing_height: u32,
    format: PixelFormat,
    mipmapped: bool,
    origin: ImageOrigin,
    sample_count: u32,
    target: OnceLock<Shared<RenderTarget<B>>>,
}

impl<B: GpuBackend> TextureRenderTargetProxy<B> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: ContentKey,
        width: u32,
        height: u32,
        backing_width: u32,
        backing_height: u32,
        format: PixelFormat,
        mipmapped: bool,
        origin: ImageOrigin,
        sample_count: u32,
    ) -> Self {
        debug_assert!(backing_width >= width && backing_height >= height);
        Self {
            key,
            width,
            height,
            backing_width: backing_width.max(width),
            backing_height: backing_height.max(height),
            format,
            mipmapped,
            origin,
            sample_count: sample_count.max(1),
            target: OnceLock::new(),
        }
    }

    pub(crate) fn bind(&self, target: Shared<RenderTarget<B>>) -> bool {
        self.target.set(target).is_ok()
    }
}

impl<B: GpuBackend> TextureProxy<B> for TextureRenderTargetProxy<B> {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn backing_store_width(&self) -> u32 {
        self.backing_width
    }

    #[inline]
    fn backing_store_height(&self) -> u32 {
        self.backing_height
    }

    #[inline]
    fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn has_mipmaps(&self) -> bool {
        self.mipmapped
    }

    #[inline]
    fn origin(&self) -> ImageOrigin {
        self.origin
    }

    #[inline]
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn get_texture(&self) -> Option<Shared<Texture<B>>> {
        self.target.get().map(|target| target.texture().clone())
    }

    fn as_render_target_proxy(self: Arc<Self>) -> Option<Arc<dyn RenderTargetProxy<B>>> {
        Some(self)
    }
}

impl<B: GpuBackend> RenderTargetProxy<B> for TextureRenderTargetProxy<B> {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn origin(&self) -> ImageOrigin {
        self.origin
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    fn externally_owned(&self) -> bool {
        false
    }

    fn get_render_target(&self) -> Option<Shared<RenderTarget<B>>> {
        self.target.get().cloned()
    }

    fn as_texture_proxy(self: Arc<Self>) -> Option<Arc<dyn TextureProxy<B>>> {
        Some(self)
    }
}

/// A window-system render target handed to the engine.
pub struct ExternalRenderTargetProxy<B: GpuBackend> {
    target: Shared<RenderTarget<B>>,
    format: PixelFormat,
    origin: ImageOrigin,
}

impl<B: GpuBackend> ExternalRenderTargetProxy<B> {
    pub fn new(target: Shared<RenderTarget<B>>) -> Self {
        let format = target.texture().format();
        let origin = target.texture().origin();
        Self { target, format, origin }
    }
}

impl<B: GpuBackend> RenderTargetProxy<B> for ExternalRenderTargetProxy<B> {
    #[inline]
    fn width(&self) -> u32 {
        self.target.width()
    }

    #[inline]
    fn height(&self) -> u32 {
        self.target.height()
    }

    #[inline]
    fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn origin(&self) -> ImageOrigin {
        self.origin
    }

    #[inline]
    fn sample_count(&self) -> u32 {
        self.target.sample_count()
    }

    #[inline]
    fn externally_owned(&self) -> bool {
        true
    }

    fn get_render_target(&self) -> Option<Shared<RenderTarget<B>>> {
        Some(self.target.clone())
    }

    fn as_texture_proxy(self: Arc<Self>) -> Option<Arc<dyn TextureProxy<B>>> {
        None
    }
}
