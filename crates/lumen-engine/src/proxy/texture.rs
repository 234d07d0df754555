use std::sync::{Arc, OnceLock};

use crate::backend::{GpuBackend, ImageOrigin, PixelFormat};
use crate::key::ContentKey;
use crate::resource::Texture;
use crate::return_queue::Shared;

use super::RenderTargetProxy;

/// Texture role of a proxy.
pub trait TextureProxy<B: GpuBackend>: Send + Sync {
    /// Logical width requested by the caller.
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Allocated width; at least [`width`](Self::width).
    fn backing_store_width(&self) -> u32 {
        self.width()
    }

    fn backing_store_height(&self) -> u32 {
        self.height()
    }

    fn format(&self) -> PixelFormat;

    fn has_mipmaps(&self) -> bool;

    fn origin(&self) -> ImageOrigin;

    fn is_alpha_only(&self) -> bool {
        self.format().is_alpha_only()
    }

    /// Empty for uncached proxies.
    fn key(&self) -> &ContentKey;

    /// The realized texture, if a task has produced it.
    fn get_texture(&self) -> Option<Shared<Texture<B>>>;

    fn is_instantiated(&self) -> bool {
        self.get_texture().is_some()
    }

    /// Returns the render-target role of the same object, if it has one.
    fn as_render_target_proxy(self: Arc<Self>) -> Option<Arc<dyn RenderTargetProxy<B>>> {
        None
    }
}

/// Proxy for an uploaded (or cache-provided) texture.
pub struct DefaultTextureProxy<B: GpuBackend> {
    key: ContentKey,
    width: u32,
    height: u32,
    format: PixelFormat,
    mipmapped: bool,
    origin: ImageOrigin,
    texture: OnceLock<Shared<Texture<B>>>,
}

impl<B: GpuBackend> DefaultTextureProxy<B> {
    pub fn new(key: ContentKey, width: u32, height: u32, format: PixelFormat, mipmapped: bool) -> Self {
        Self {
            key,
            width,
            height,
            format,
            mipmapped,
            origin: ImageOrigin::TopLeft,
            texture: OnceLock::new(),
        }
    }

    /// A proxy that is materialized from the start.
    pub fn instantiated(key: ContentKey, width: u32, height: u32, texture: Shared<Texture<B>>) -> Self {
        let proxy = Self {
            key,
            width,
            height,
            format: texture.format(),
            mipmapped: texture.has_mipmaps(),
            origin: texture.origin(),
            texture: OnceLock::new(),
        };
        let _ = proxy.texture.set(texture);
        proxy
    }

    /// Binds the realized texture. Returns `false` if one was already bound.
    pub(crate) fn bind(&self, texture: Shared<Texture<B>>) -> bool {
        self.texture.set(texture).is_ok()
    }
}

impl<B: GpuBackend> TextureProxy<B> for DefaultTextureProxy<B> {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    fn backing_store_width(&self) -> u32 {
        self.texture.get().map_or(self.width, |t| t.width())
    }

    fn backing_store_height(&self) -> u32 {
        self.texture.get().map_or(self.height, |t| t.height())
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
        self.texture.get().cloned()
    }
}
