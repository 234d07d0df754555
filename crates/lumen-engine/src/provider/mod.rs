//! Proxy factory and deduplication point.
//!
//! [`ProxyProvider`] is a short-lived view over a
//! [`Context`](crate::context::Context). Every creation call either returns
//! the live proxy already registered under the same key, wraps a resource
//! still held by the cache, or registers a new proxy and queues exactly one
//! task to materialize it. Calls never block on GPU work.

mod gradient;
mod options;
mod proxy_provider;
mod registry;
mod vertex;

pub use options::RenderTargetOptions;
pub use proxy_provider::ProxyProvider;

pub(crate) use registry::ProxyRegistry;
pub(crate) use vertex::SharedVertexBlock;
