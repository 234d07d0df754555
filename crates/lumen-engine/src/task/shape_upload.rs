use std::sync::Arc;

use crate::backend::{BufferUsage, GpuBackend, PixelFormat};
use crate::key::ContentKey;
use crate::proxy::{ShapeProxy, TextureProxy};
use crate::source::{DataSource, ShapeBuffer};

use super::buffer_upload::upload_buffer;
use super::texture_upload::upload_texture;
use super::{ResourceTask, TaskContext};

/// Uploads a rasterized shape as triangles or as an alpha mask.
pub struct ShapeBufferUploadTask<B: GpuBackend> {
    proxy: Arc<ShapeProxy<B>>,
    source: Option<Box<dyn DataSource<ShapeBuffer>>>,
    buffer: Option<Arc<ShapeBuffer>>,
}

impl<B: GpuBackend> ShapeBufferUploadTask<B> {
    pub fn new(proxy: Arc<ShapeProxy<B>>, source: Box<dyn DataSource<ShapeBuffer>>) -> Self {
        Self {
            proxy,
            source: Some(source),
            buffer: None,
        }
    }
}

impl<B: GpuBackend> ResourceTask<B> for ShapeBufferUploadTask<B> {
    fn key(&self) -> &ContentKey {
        self.proxy.key()
    }

    fn prepare(&mut self) -> bool {
        if let Some(source) = self.source.take() {
            self.buffer = source.get_data().filter(|buffer| match &**buffer {
                ShapeBuffer::Triangles(vertices) => !vertices.is_empty(),
                ShapeBuffer::Mask(image) => !image.is_empty(),
            });
            if self.buffer.is_none() {
                log::debug!("shape rasterized to nothing");
            }
        }
        self.buffer.is_some()
    }

    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let Some(buffer) = self.buffer else {
            return false;
        };
        let proxy = self.proxy;
        let key = proxy.key();
        match &*buffer {
            ShapeBuffer::Triangles(vertices) => {
                let Some(gpu) = upload_buffer(ctx, bytemuck::cast_slice(vertices), BufferUsage::Vertex) else {
                    return false;
                };
                if key.is_valid() {
                    ctx.cache().add_buffer(key, &gpu);
                }
                proxy.triangles().bind(gpu)
            }
            ShapeBuffer::Mask(image) => {
                let mask = proxy.mask();
                let Some(texture) = upload_texture(ctx, image, mask.width(), mask.height(), PixelFormat::Alpha8, false)
                else {
                    return false;
                };
                if key.is_valid() {
                    ctx.cache().add_texture(key, &texture);
                }
                mask.bind(texture)
            }
        }
    }
}
