//! Context-scoped resource registry.
//!
//! - [`ResourceCache`]: key → weak resource map plus LRU retention of
//!   recently used resources, and ownership of the context's return queue.
//! - [`LruCache`]: the strict access-order LRU used for retention and for
//!   bounded caches such as gradients.
//!
//! Everything here is mutated only on the context-owning thread.

mod lru;
mod resource_cache;

pub use lru::LruCache;
pub use resource_cache::{CachedResource, ResourceCache, ResourceKind};
