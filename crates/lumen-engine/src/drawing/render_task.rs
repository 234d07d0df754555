use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::proxy::RenderTargetProxy;
use crate::resource::RenderTarget;
use crate::task::TaskContext;

/// A render pass recorded against a render-target proxy.
pub trait RenderTask<B: GpuBackend> {
    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool;
}

type RenderOps<B> = Box<dyn FnOnce(&RenderTarget<B>, &B) -> bool>;

/// Runs recorded drawing operations against the realized target.
pub struct OpsRenderTask<B: GpuBackend> {
    target: Arc<dyn RenderTargetProxy<B>>,
    ops: RenderOps<B>,
}

impl<B: GpuBackend> OpsRenderTask<B> {
    pub fn new<F>(target: Arc<dyn RenderTargetProxy<B>>, ops: F) -> Self
    where
        F: FnOnce(&RenderTarget<B>, &B) -> bool + 'static,
    {
        Self {
            target,
            ops: Box::new(ops),
        }
    }
}

impl<B: GpuBackend> RenderTask<B> for OpsRenderTask<B> {
    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool {
        let Some(target) = self.target.get_render_target() else {
            log::warn!("render pass skipped: target was never materialized");
            return false;
        };
        (self.ops)(&target, ctx.backend())
    }
}
