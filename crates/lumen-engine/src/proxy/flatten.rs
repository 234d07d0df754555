use std::sync::{Arc, OnceLock};

use crate::backend::{GpuBackend, ImageOrigin, PixelFormat};
use crate::key::ContentKey;
use crate::resource::Texture;
use crate::return_queue::Shared;

use super::TextureProxy;

/// A standalone copy of another texture proxy's contents.
///
/// Until the flatten task binds the copy, every query is answered by the
/// source proxy, including [`get_texture`](TextureProxy::get_texture).
pub struct FlattenTextureProxy<B: GpuBackend> {
    key: ContentKey,
    source: Arc<dyn TextureProxy<B>>,
    flattened: OnceLock<Shared<Texture<B>>>,
}

impl<B: GpuBackend> FlattenTextureProxy<B> {
    pub fn new(key: ContentKey, source: Arc<dyn TextureProxy<B>>) -> Self {
        Self {
            key,
            source,
            flattened: OnceLock::new(),
        }
    }

    #[inline]
    pub fn source(&self) -> &Arc<dyn TextureProxy<B>> {
        &self.source
    }

    #[inline]
    pub fn is_flattened(&self) -> bool {
        self.flattened.get().is_some()
    }

    pub(crate) fn bind(&self, texture: Shared<Texture<B>>) -> bool {
        self.flattened.set(texture).is_ok()
    }
}

impl<B: GpuBackend> TextureProxy<B> for FlattenTextureProxy<B> {
    fn width(&self) -> u32 {
        self.source.width()
    }

    fn height(&self) -> u32 {
        self.source.height()
    }

    fn backing_store_width(&self) -> u32 {
        self.source.backing_store_width()
    }

    fn backing_store_height(&self) -> u32 {
        self.source.backing_store_height()
    }

    fn format(&self) -> PixelFormat {
        self.source.format()
    }

    fn has_mipmaps(&self) -> bool {
        self.source.has_mipmaps()
    }

    fn origin(&self) -> ImageOrigin {
        self.source.origin()
    }

    fn is_alpha_only(&self) -> bool {
        self.source.is_alpha_only()
    }

    #[inline]
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn get_texture(&self) -> Option<Shared<Texture<B>>> {
        match self.flattened.get() {
            Some(texture) => Some(texture.clone()),
            None => self.source.get_texture(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TextureDescriptor;
    use crate::cache::ResourceCache;
    use crate::proxy::DefaultTextureProxy;
    use crate::testing::RecordingBackend;

    #[test]
    fn delegates_to_source_until_flattened() {
        let backend = RecordingBackend::new();
        let cache = ResourceCache::new(4);
        let desc = TextureDescriptor::new(24, 12, PixelFormat::Rgba8888).with_mipmaps(true);
        let make = || {
            let native = backend.create_texture(&desc).expect("fake texture");
            cache.wrap_texture(Texture::new(native, desc, ImageOrigin::TopLeft))
        };

        let source = Arc::new(DefaultTextureProxy::<RecordingBackend>::new(
            ContentKey::new(),
            24,
            12,
            PixelFormat::Rgba8888,
            true,
        ));
        let flat = FlattenTextureProxy::new(ContentKey::new(), source.clone());
        assert_eq!((flat.width(), flat.height()), (24, 12));
        assert!(flat.has_mipmaps());
        assert!(flat.get_texture().is_none());

        let original = make();
        assert!(source.bind(original.clone()));
        let seen = flat.get_texture().expect("source texture");
        assert!(Shared::ptr_eq(&seen, &original));

        let copy = make();
        assert!(flat.bind(copy.clone()));
        assert!(flat.is_flattened());
        let seen = flat.get_texture().expect("flattened texture");
        assert!(Shared::ptr_eq(&seen, &copy));
    }
}
