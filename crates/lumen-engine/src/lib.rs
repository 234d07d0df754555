//! Lumen engine crate.
//!
//! GPU resource lifecycle for a 2D renderer: content keys, deferred
//! cross-thread destruction, a keyed resource cache, lazy proxies with the
//! tasks that materialize them, and the per-context flush that ties them
//! together.
//!
//! Typical use:
//! - build a [`backend::WgpuBackend`] (or any [`backend::GpuBackend`]);
//! - wrap it in a [`context::Context`];
//! - request proxies through [`context::Context::proxy_provider`] while
//!   recording draws;
//! - call [`context::Context::flush`] once per frame.

pub mod backend;
pub mod cache;
pub mod context;
pub mod drawing;
pub mod geom;
pub mod key;
pub mod logging;
pub mod provider;
pub mod proxy;
pub mod resource;
pub mod return_queue;
pub mod source;
pub mod task;

#[cfg(test)]
mod testing;
