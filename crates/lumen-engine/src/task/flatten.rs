use std::sync::Arc;

use crate::backend::{GpuBackend, TextureDescriptor};
use crate::key::ContentKey;
use crate::proxy::{FlattenTextureProxy, TextureProxy};
use crate::resource::Texture;

use super::{ResourceTask, TaskContext};

/// Copies the current contents of a proxy's source into a standalone texture.
pub struct TextureFlattenTask<B: GpuBackend> {
    proxy: Arc<FlattenTextureProxy<B>>,
}

impl<B: GpuBackend> TextureFlattenTask<B> {
    pub fn new(proxy: Arc<FlattenTextureProxy<B>>) -> Self {
        Self { proxy }
    }
}

impl<B: GpuBackend> ResourceTask<B> for TextureFlattenTask<B> {
    fn key(&self) -> &ContentKey {
        self.proxy.key()
    }

    // The source may be materialized by an earlier task of the same flush,
    // so its presence is only checked at execution.
    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let proxy = self.proxy;
        let Some(source) = proxy.source().get_texture() else {
            log::warn!("flatten: source texture was never materialized");
            return false;
        };

        let desc = TextureDescriptor::new(source.width(), source.height(), source.format())
            .with_mipmaps(source.has_mipmaps());
        let (backend, cache) = ctx.split();
        let Some(native) = backend.create_texture(&desc) else {
            log::warn!("flatten: failed to create {}x{} texture", desc.width, desc.height);
            return false;
        };
        let copy = cache.wrap_texture(Texture::new(native, desc, source.origin()));
        if !backend.copy_texture(source.native(), copy.native(), desc.width, desc.height) {
            log::warn!("flatten: texture copy failed");
            return false;
        }
        if proxy.key().is_valid() {
            cache.add_texture(proxy.key(), &copy);
        }
        log::debug!("flattened {}x{} texture", desc.width, desc.height);
        proxy.bind(copy)
    }
}
