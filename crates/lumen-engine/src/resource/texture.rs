use std::fmt;

use crate::backend::{GpuBackend, ImageOrigin, NativeResource, PixelFormat, TextureDescriptor};
use crate::return_queue::ReturnNode;

/// A GPU texture. Dimensions are those of the backing store.
pub struct Texture<B: GpuBackend> {
    native: B::Texture,
    desc: TextureDescriptor,
    origin: ImageOrigin,
    /// Window-system textures are never destroyed by the engine.
    externally_owned: bool,
}

impl<B: GpuBackend> Texture<B> {
    pub fn new(native: B::Texture, desc: TextureDescriptor, origin: ImageOrigin) -> Self {
        Self {
            native,
            desc,
            origin,
            externally_owned: false,
        }
    }

    /// Wraps a texture the engine must never release.
    pub fn wrap_external(native: B::Texture, desc: TextureDescriptor, origin: ImageOrigin) -> Self {
        Self {
            native,
            desc,
            origin,
            externally_owned: true,
        }
    }

    #[inline]
    pub fn native(&self) -> &B::Texture {
        &self.native
    }

    #[inline]
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    #[inline]
    pub fn has_mipmaps(&self) -> bool {
        self.desc.has_mipmaps()
    }

    #[inline]
    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    #[inline]
    pub fn externally_owned(&self) -> bool {
        self.externally_owned
    }
}

impl<B: GpuBackend> ReturnNode for Texture<B> {
    fn release_native(&mut self) {
        if !self.externally_owned {
            self.native.release();
        }
    }
}

impl<B: GpuBackend> fmt::Debug for Texture<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("native", &self.native)
            .field("desc", &self.desc)
            .field("origin", &self.origin)
            .field("externally_owned", &self.externally_owned)
            .finish()
    }
}
