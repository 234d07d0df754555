use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::cache::{LruCache, ResourceCache};
use crate::drawing::DrawingManager;
use crate::key::ContentKey;
use crate::provider::{ProxyProvider, ProxyRegistry, SharedVertexBlock};
use crate::proxy::TextureProxy;
use crate::source::WorkerPool;
use crate::task::TaskContext;

use super::{EngineConfig, FlushOutcome};

/// Resource-layer state for one GPU context.
///
/// All methods must be called from the thread that owns the GPU context.
/// Resources and proxies themselves may be dropped from any thread.
pub struct Context<B: GpuBackend> {
    pub(crate) backend: B,
    pub(crate) config: EngineConfig,
    pub(crate) cache: ResourceCache<B>,
    pub(crate) proxies: ProxyRegistry<B>,
    pub(crate) gradients: LruCache<ContentKey, Arc<dyn TextureProxy<B>>>,
    pub(crate) vertices: SharedVertexBlock<B>,
    pub(crate) drawing: DrawingManager<B>,
    pub(crate) workers: Option<WorkerPool>,
}

impl<B: GpuBackend> Context<B> {
    /// Creates a context. A worker pool that fails to start leaves threading
    /// disabled rather than failing the context.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        let workers = if config.threading {
            match WorkerPool::new(config.worker_threads) {
                Ok(pool) => Some(pool),
                Err(err) => {
                    log::warn!("worker pool unavailable, running data sources inline: {err:#}");
                    None
                }
            }
        } else {
            None
        };
        log::debug!(
            "context created (threading: {}, cache limit: {})",
            workers.is_some(),
            config.resource_cache_limit
        );

        Self {
            cache: ResourceCache::new(config.resource_cache_limit),
            proxies: ProxyRegistry::new(),
            gradients: LruCache::new(config.gradient_cache_limit),
            vertices: SharedVertexBlock::new(),
            drawing: DrawingManager::new(),
            workers,
            backend,
            config,
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn resource_cache(&self) -> &ResourceCache<B> {
        &self.cache
    }

    #[inline]
    pub fn drawing_manager(&self) -> &DrawingManager<B> {
        &self.drawing
    }

    #[inline]
    pub fn worker_pool(&self) -> Option<&WorkerPool> {
        self.workers.as_ref()
    }

    /// Number of gradient textures currently kept alive.
    #[inline]
    pub fn gradient_cache_len(&self) -> usize {
        self.gradients.len()
    }

    /// Factory for proxies backed by this context.
    pub fn proxy_provider(&mut self) -> ProxyProvider<'_, B> {
        ProxyProvider::new(self)
    }

    /// Ends the frame: uploads the pending shared vertex block, runs every
    /// queued task, releases unreferenced resources and drops expired cache
    /// entries.
    pub fn flush(&mut self) -> FlushOutcome {
        if self.backend.is_device_lost() {
            log::warn!("device lost before flush; abandoning frame");
            self.abandon();
            return FlushOutcome::DeviceLost;
        }

        let mut provider = self.proxy_provider();
        provider.flush_shared_vertex_buffer();
        provider.clear_shared_vertex_buffer();

        let report = {
            let mut ctx = TaskContext::new(&self.backend, &mut self.cache);
            self.drawing.flush(&mut ctx)
        };

        if self.backend.is_device_lost() {
            log::warn!("device lost during flush; abandoning frame");
            self.abandon();
            return FlushOutcome::DeviceLost;
        }

        self.cache.process_unreferenced();
        self.cache.purge_expired();
        self.proxies.purge_expired();

        if report.is_empty() {
            FlushOutcome::Idle
        } else {
            FlushOutcome::Submitted(report)
        }
    }

    /// Device-loss reset: drops queued tasks, registered proxies and cached
    /// resources without issuing any native call.
    pub fn abandon(&mut self) {
        self.drawing.abandon();
        self.proxies.clear();
        self.gradients.clear();
        self.vertices.end_frame();
        self.cache.abandon();
    }
}

impl<B: GpuBackend> Drop for Context<B> {
    fn drop(&mut self) {
        self.drawing.abandon();
        self.proxies.clear();
        self.gradients.clear();
        self.vertices.end_frame();
        if self.backend.is_device_lost() {
            self.cache.abandon();
        } else {
            self.cache.release_all();
        }
    }
}
