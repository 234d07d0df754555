use std::sync::Arc;

use crate::backend::{GpuBackend, ImageOrigin, PixelFormat, TextureDescriptor};
use crate::key::ContentKey;
use crate::proxy::{DefaultTextureProxy, TextureProxy};
use crate::resource::Texture;
use crate::return_queue::Shared;
use crate::source::{DataSource, ImageBuffer};

use super::{ResourceTask, TaskContext};

/// Uploads pixels from a data source into a new texture.
pub struct TextureUploadTask<B: GpuBackend> {
    proxy: Arc<DefaultTextureProxy<B>>,
    source: Option<Box<dyn DataSource<ImageBuffer>>>,
    image: Option<Arc<ImageBuffer>>,
}

impl<B: GpuBackend> TextureUploadTask<B> {
    pub fn new(proxy: Arc<DefaultTextureProxy<B>>, source: Box<dyn DataSource<ImageBuffer>>) -> Self {
        Self {
            proxy,
            source: Some(source),
            image: None,
        }
    }
}

impl<B: GpuBackend> ResourceTask<B> for TextureUploadTask<B> {
    fn key(&self) -> &ContentKey {
        self.proxy.key()
    }

    fn prepare(&mut self) -> bool {
        if let Some(source) = self.source.take() {
            self.image = source.get_data().filter(|image| !image.is_empty());
            if self.image.is_none() {
                log::warn!("texture source produced no pixels");
            }
        }
        self.image.is_some()
    }

    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let Some(image) = self.image else {
            return false;
        };
        let proxy = self.proxy;
        let Some(texture) = upload_texture(
            ctx,
            &image,
            proxy.width(),
            proxy.height(),
            proxy.format(),
            proxy.has_mipmaps(),
        ) else {
            return false;
        };
        if proxy.key().is_valid() {
            ctx.cache().add_texture(proxy.key(), &texture);
        }
        proxy.bind(texture)
    }
}

/// Creates a `width x height` texture and writes `image` into its top-left
/// corner. The image must fit and match `format`.
pub(super) fn upload_texture<B: GpuBackend>(
    ctx: &mut TaskContext<'_, B>,
    image: &ImageBuffer,
    width: u32,
    height: u32,
    format: PixelFormat,
    mipmapped: bool,
) -> Option<Shared<Texture<B>>> {
    if image.format() != format {
        log::warn!("texture upload: expected {format:?} pixels, got {:?}", image.format());
        return None;
    }
    if image.width() > width || image.height() > height {
        log::warn!(
            "texture upload: {}x{} image does not fit a {width}x{height} texture",
            image.width(),
            image.height()
        );
        return None;
    }

    let desc = TextureDescriptor::new(width, height, format).with_mipmaps(mipmapped);
    let (backend, cache) = ctx.split();
    let Some(native) = backend.create_texture(&desc) else {
        log::warn!("texture upload: failed to create {width}x{height} {format:?} texture");
        return None;
    };
    let texture = cache.wrap_texture(Texture::new(native, desc, ImageOrigin::TopLeft));
    if !backend.write_texture(texture.native(), image) {
        log::warn!("texture upload: pixel write failed");
        return None;
    }
    log::debug!("uploaded {width}x{height} {format:?} texture");
    Some(texture)
}
