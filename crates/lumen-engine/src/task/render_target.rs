use std::sync::Arc;

use crate::backend::{GpuBackend, TextureDescriptor};
use crate::key::ContentKey;
use crate::proxy::{RenderTargetProxy, TextureProxy, TextureRenderTargetProxy};
use crate::resource::{RenderTarget, Texture};

use super::{ResourceTask, TaskContext};

/// Allocates the textures behind an offscreen render target.
pub struct RenderTargetCreateTask<B: GpuBackend> {
    proxy: Arc<TextureRenderTargetProxy<B>>,
}

impl<B: GpuBackend> RenderTargetCreateTask<B> {
    pub fn new(proxy: Arc<TextureRenderTargetProxy<B>>) -> Self {
        Self { proxy }
    }
}

impl<B: GpuBackend> ResourceTask<B> for RenderTargetCreateTask<B> {
    fn key(&self) -> &ContentKey {
        TextureProxy::key(&*self.proxy)
    }

    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let proxy = &*self.proxy;
        let width = proxy.backing_store_width();
        let height = proxy.backing_store_height();
        let format = TextureProxy::format(proxy);
        let samples = RenderTargetProxy::sample_count(proxy);

        let (backend, cache) = ctx.split();
        let desc = TextureDescriptor::new(width, height, format)
            .with_mipmaps(proxy.has_mipmaps())
            .with_render_target(1);
        let Some(native) = backend.create_texture(&desc) else {
            log::warn!("render target: failed to create {width}x{height} {format:?} texture");
            return false;
        };
        let texture = cache.wrap_texture(Texture::new(native, desc, TextureProxy::origin(proxy)));

        let msaa = if samples > 1 {
            let msaa_desc = TextureDescriptor::new(width, height, format).with_render_target(samples);
            let Some(native) = backend.create_texture(&msaa_desc) else {
                log::warn!("render target: failed to create {samples}x multisample texture");
                return false;
            };
            Some(native)
        } else {
            None
        };

        let target = cache.wrap_render_target(RenderTarget::new(texture, msaa, samples));
        log::debug!("created {width}x{height} render target ({samples} samples)");
        proxy.bind(target)
    }
}
