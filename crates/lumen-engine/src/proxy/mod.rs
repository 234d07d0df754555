//! Lazy handles for GPU resources.
//!
//! A proxy describes a resource (size, format, origin) before the resource
//! exists. Proxies are created by the provider and materialized only by
//! resource tasks during a flush; `get_*` accessors never block and never
//! create anything.
//!
//! Render targets expose two roles through [`TextureProxy`] and
//! [`RenderTargetProxy`]; a proxy that supports both returns itself from the
//! `as_*` casts, so both views share one identity.

mod buffer;
mod flatten;
mod render_target;
mod shape;
mod sizing;
mod texture;

pub use buffer::{GpuBufferProxy, VertexBufferView};
pub use flatten::FlattenTextureProxy;
pub use render_target::{ExternalRenderTargetProxy, RenderTargetProxy, TextureRenderTargetProxy};
pub use shape::ShapeProxy;
pub use sizing::approximate_size;
pub use texture::{DefaultTextureProxy, TextureProxy};
