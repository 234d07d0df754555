use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::key::ContentKey;
use crate::resource::{GpuBuffer, RenderTarget, Texture};
use crate::return_queue::{ReturnQueue, Shared, WeakShared};

use super::LruCache;

/// Resource families tracked by the cache. The same key may name one
/// resource of each kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Texture,
    Buffer,
}

/// A strong handle retained by the LRU list.
pub enum CachedResource<B: GpuBackend> {
    Texture(Shared<Texture<B>>),
    Buffer(Shared<GpuBuffer<B>>),
}

/// Key → resource registry for one GPU context.
///
/// The key maps hold weak handles only. Recently used resources are kept
/// alive by a bounded LRU list of strong handles, so content that falls out
/// of use for a while can still be found again without re-uploading.
pub struct ResourceCache<B: GpuBackend> {
    queue: Arc<ReturnQueue>,
    textures: HashMap<ContentKey, WeakShared<Texture<B>>>,
    buffers: HashMap<ContentKey, WeakShared<GpuBuffer<B>>>,
    retained: LruCache<(ResourceKind, ContentKey), CachedResource<B>>,
}

impl<B: GpuBackend> ResourceCache<B> {
    pub fn new(retention_limit: usize) -> Self {
        Self {
            queue: ReturnQueue::make(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            retained: LruCache::new(retention_limit),
        }
    }

    #[inline]
    pub fn return_queue(&self) -> &Arc<ReturnQueue> {
        &self.queue
    }

    // ── wrapping ──────────────────────────────────────────────────────────

    pub fn wrap_texture(&self, texture: Texture<B>) -> Shared<Texture<B>> {
        self.queue.make_shared(texture)
    }

    pub fn wrap_buffer(&self, buffer: GpuBuffer<B>) -> Shared<GpuBuffer<B>> {
        self.queue.make_shared(buffer)
    }

    pub fn wrap_render_target(&self, target: RenderTarget<B>) -> Shared<RenderTarget<B>> {
        self.queue.make_shared(target)
    }

    // ── lookup ────────────────────────────────────────────────────────────

    /// Returns the live texture registered under `key`.
    ///
    /// An expired entry is dropped here; a hit marks the key most recently
    /// used.
    pub fn find_texture(&mut self, key: &ContentKey) -> Option<Shared<Texture<B>>> {
        debug_assert!(key.is_valid(), "cache lookup with an empty key");
        if !key.is_valid() {
            return None;
        }
        let found = lookup(&mut self.textures, key)?;
        self.promote(ResourceKind::Texture, key);
        log::trace!("texture cache hit ({} words)", key.len());
        Some(found)
    }

    pub fn find_buffer(&mut self, key: &ContentKey) -> Option<Shared<GpuBuffer<B>>> {
        debug_assert!(key.is_valid(), "cache lookup with an empty key");
        if !key.is_valid() {
            return None;
        }
        let found = lookup(&mut self.buffers, key)?;
        self.promote(ResourceKind::Buffer, key);
        log::trace!("buffer cache hit ({} words)", key.len());
        Some(found)
    }

    // ── registration ──────────────────────────────────────────────────────

    pub fn add_texture(&mut self, key: &ContentKey, texture: &Shared<Texture<B>>) {
        debug_assert!(key.is_valid(), "cache insert with an empty key");
        if !key.is_valid() {
            return;
        }
        self.textures.insert(key.clone(), Shared::downgrade(texture));
        self.retain(ResourceKind::Texture, key, CachedResource::Texture(texture.clone()));
    }

    pub fn add_buffer(&mut self, key: &ContentKey, buffer: &Shared<GpuBuffer<B>>) {
        debug_assert!(key.is_valid(), "cache insert with an empty key");
        if !key.is_valid() {
            return;
        }
        self.buffers.insert(key.clone(), Shared::downgrade(buffer));
        self.retain(ResourceKind::Buffer, key, CachedResource::Buffer(buffer.clone()));
    }

    // ── maintenance ───────────────────────────────────────────────────────

    /// Removes entries whose resource has been destroyed. Returns how many
    /// were removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.textures.len() + self.buffers.len();
        self.textures.retain(|_, weak| !weak.is_expired());
        self.buffers.retain(|_, weak| !weak.is_expired());
        let purged = before - (self.textures.len() + self.buffers.len());
        if purged > 0 {
            log::debug!("purged {purged} expired cache entries");
        }
        purged
    }

    /// Releases the native handles of every resource whose last reference was
    /// dropped since the previous call.
    pub fn process_unreferenced(&mut self) -> usize {
        self.queue.drain()
    }

    /// Drops every entry and releases what is no longer referenced elsewhere.
    pub fn release_all(&mut self) -> usize {
        self.textures.clear();
        self.buffers.clear();
        self.retained.clear();
        self.queue.drain()
    }

    /// Forgets all resources without touching the device.
    ///
    /// The current return queue is dropped with whatever it holds. Resources
    /// still referenced elsewhere are deleted without a native release once
    /// the last holder lets go. Later resources use a fresh queue.
    pub fn abandon(&mut self) {
        self.textures.clear();
        self.buffers.clear();
        self.retained.clear();
        let pending = self.queue.len();
        self.queue = ReturnQueue::make();
        log::warn!("resource cache abandoned ({pending} resources dropped without release)");
    }

    // ── introspection ─────────────────────────────────────────────────────

    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    #[inline]
    pub fn retention_limit(&self) -> usize {
        self.retained.capacity()
    }

    pub fn is_retained(&self, kind: ResourceKind, key: &ContentKey) -> bool {
        self.retained.contains(&(kind, key.clone()))
    }

    fn promote(&mut self, kind: ResourceKind, key: &ContentKey) {
        self.retained.touch(&(kind, key.clone()));
    }

    fn retain(&mut self, kind: ResourceKind, key: &ContentKey, resource: CachedResource<B>) {
        for ((kind, _), _) in self.retained.insert((kind, key.clone()), resource) {
            log::debug!("evicted {kind:?} from cache retention");
        }
    }
}

fn lookup<T: crate::return_queue::ReturnNode>(
    map: &mut HashMap<ContentKey, WeakShared<T>>,
    key: &ContentKey,
) -> Option<Shared<T>> {
    let weak = map.get(key)?;
    match weak.upgrade() {
        Some(strong) => Some(strong),
        None => {
            map.remove(key);
            None
        }
    }
}

impl<B: GpuBackend> std::fmt::Debug for ResourceCache<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("textures", &self.textures.len())
            .field("buffers", &self.buffers.len())
            .field("retained", &self.retained.len())
            .field("queue", &self.queue)
            .finish()
    }
}
