//! Deferred resource work.
//!
//! Every task follows the same two phases:
//! - `prepare` pulls the CPU-side payload from its data source. It never
//!   touches the GPU; a source started on a worker is simply waited on here.
//! - `execute` runs on the GPU-owning thread, creates the native object,
//!   uploads into it, registers it with the cache and binds it into the proxy
//!   that commissioned the task.
//!
//! `execute` consumes the task, so a task can never run twice and its proxy
//! references are released as soon as the binding is done.

mod buffer_upload;
mod flatten;
mod render_target;
mod shape_upload;
mod texture_upload;

use crate::backend::GpuBackend;
use crate::cache::ResourceCache;
use crate::key::ContentKey;

pub use buffer_upload::GpuBufferUploadTask;
pub use flatten::TextureFlattenTask;
pub use render_target::RenderTargetCreateTask;
pub use shape_upload::ShapeBufferUploadTask;
pub use texture_upload::TextureUploadTask;

/// Lifecycle of a queued task.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TaskState {
    /// Queued, nothing done yet.
    Pending,
    /// CPU payload ready.
    Prepared,
    /// GPU work issued and proxy bound.
    Executed,
    /// Finished (successfully or not) and dropped.
    Retired,
}

/// What a task may touch while executing.
pub struct TaskContext<'a, B: GpuBackend> {
    backend: &'a B,
    cache: &'a mut ResourceCache<B>,
}

impl<'a, B: GpuBackend> TaskContext<'a, B> {
    pub fn new(backend: &'a B, cache: &'a mut ResourceCache<B>) -> Self {
        Self { backend, cache }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        self.backend
    }

    #[inline]
    pub fn cache(&mut self) -> &mut ResourceCache<B> {
        &mut *self.cache
    }

    /// Backend and cache borrowed together.
    #[inline]
    pub fn split(&mut self) -> (&B, &mut ResourceCache<B>) {
        (self.backend, &mut *self.cache)
    }
}

/// A one-shot unit of work that materializes one proxy.
pub trait ResourceTask<B: GpuBackend> {
    /// Key of the resource this task produces; empty for uncached content.
    fn key(&self) -> &ContentKey;

    /// Builds the CPU payload. Returning `false` skips execution.
    fn prepare(&mut self) -> bool {
        true
    }

    /// Issues the GPU work and binds the result. Returns `false` on failure,
    /// in which case the proxy stays unmaterialized.
    fn execute(self: Box<Self>, ctx: &mut TaskContext<'_, B>) -> bool;
}
