//! GPU backend interface.
//!
//! The proxy and task layers never talk to a graphics API directly. They go
//! through [`GpuBackend`], whose calls are synchronous and confined to the
//! thread that owns the GPU context (in practice: task execution).
//!
//! [`WgpuBackend`] is the production implementation.

mod descriptor;
mod format;
mod gpu;

use std::fmt;

use crate::source::ImageBuffer;

pub use descriptor::{BufferUsage, ImageOrigin, TextureDescriptor};
pub use format::PixelFormat;
pub use gpu::{WgpuBackend, WgpuBackendInit};

/// A native GPU handle owned by a backend.
pub trait NativeResource: Send + Sync + fmt::Debug + 'static {
    /// Frees the underlying GPU memory. Called at most once, on the
    /// context-owning thread.
    fn release(&self);
}

/// Operations the resource layer consumes from a graphics API.
pub trait GpuBackend: 'static {
    type Texture: NativeResource;
    type Buffer: NativeResource;

    fn create_texture(&self, desc: &TextureDescriptor) -> Option<Self::Texture>;

    fn create_buffer(&self, size: usize, usage: BufferUsage) -> Option<Self::Buffer>;

    /// Uploads `image` into the top-left corner of mip level 0.
    fn write_texture(&self, texture: &Self::Texture, image: &ImageBuffer) -> bool;

    fn write_buffer(&self, buffer: &Self::Buffer, offset: usize, bytes: &[u8]) -> bool;

    /// Copies the `width x height` top-left region of `src` into `dst`.
    fn copy_texture(&self, src: &Self::Texture, dst: &Self::Texture, width: u32, height: u32) -> bool;

    fn is_format_renderable(&self, format: PixelFormat) -> bool;

    /// Returns the smallest supported sample count `>= requested`, or 1.
    fn sample_count(&self, requested: u32, format: PixelFormat) -> u32;

    fn max_texture_size(&self) -> u32;

    fn is_device_lost(&self) -> bool {
        false
    }
}
