//! Realized GPU resources.
//!
//! Each type owns native backend handles and implements
//! [`ReturnNode`](crate::return_queue::ReturnNode), so it lives behind a
//! [`Shared`](crate::return_queue::Shared) handle whose last drop defers the
//! native release to the context-owning thread.

mod buffer;
mod render_target;
mod texture;

pub use buffer::GpuBuffer;
pub use render_target::RenderTarget;
pub use texture::Texture;
