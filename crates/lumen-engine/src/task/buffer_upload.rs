use std::sync::Arc;

use crate::backend::{BufferUsage, GpuBackend};
use crate::key::ContentKey;
use crate::proxy::GpuBufferProxy;
use crate::resource::GpuBuffer;
use crate::return_queue::Shared;
use crate::source::DataSource;

use super::{ResourceTask, TaskContext};

/// Uploads bytes from a data source into a new GPU buffer.
pub struct GpuBufferUploadTask<B: GpuBackend> {
    proxy: Arc<GpuBufferProxy<B>>,
    source: Option<Box<dyn DataSource<Vec<u8>>>>,
    data: Option<Arc<Vec<u8>>>,
}

impl<B: GpuBackend> GpuBufferUploadTask<B> {
    pub fn new(proxy: Arc<GpuBufferProxy<B>>, source: Box<dyn DataSource<Vec<u8>>>) -> Self {
        Self {
            proxy,
            source: Some(source),
            data: None,
        }
    }
}

impl<B: GpuBackend> ResourceTask<B> for GpuBufferUploadTask<B> {
    fn key(&self) -> &ContentKey {
        self.proxy.key()
    }

    fn prepare(&mut self) -> bool {
        if let Some(source) = self.source.take() {
            self.data = source.get_data().filter(|data| !data.is_empty());
            if self.data.is_none() {
                log::warn!("buffer source produced no data");
            }
        }
        self.data.is_some()
    }

    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let Some(data) = self.data else {
            return false;
        };
        let proxy = self.proxy;
        let declared = proxy.size();
        if declared != 0 && declared != data.len() {
            log::warn!("buffer upload: expected {declared} bytes, got {}", data.len());
            return false;
        }
        let Some(buffer) = upload_buffer(ctx, &data, proxy.usage()) else {
            return false;
        };
        if proxy.key().is_valid() {
            ctx.cache().add_buffer(proxy.key(), &buffer);
        }
        proxy.bind(buffer)
    }
}

pub(super) fn upload_buffer<B: GpuBackend>(
    ctx: &mut TaskContext<'_, B>,
    bytes: &[u8],
    usage: BufferUsage,
) -> Option<Shared<GpuBuffer<B>>> {
    let (backend, cache) = ctx.split();
    let Some(native) = backend.create_buffer(bytes.len(), usage) else {
        log::warn!("buffer upload: failed to create {} byte {usage:?} buffer", bytes.len());
        return None;
    };
    let buffer = cache.wrap_buffer(GpuBuffer::new(native, bytes.len(), usage));
    if !backend.write_buffer(buffer.native(), 0, bytes) {
        log::warn!("buffer upload: write failed");
        return None;
    }
    log::debug!("uploaded {} byte {usage:?} buffer", bytes.len());
    Some(buffer)
}
