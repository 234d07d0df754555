use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::backend::GpuBackend;
use crate::key::ContentKey;
use crate::proxy::{GpuBufferProxy, RenderTargetProxy, ShapeProxy, TextureProxy};

/// Key → live proxy maps. Entries are weak: a proxy lives exactly as long as
/// someone outside the registry holds it.
pub(crate) struct ProxyRegistry<B: GpuBackend> {
    textures: HashMap<ContentKey, Weak<dyn TextureProxy<B>>>,
    render_targets: HashMap<ContentKey, Weak<dyn RenderTargetProxy<B>>>,
    buffers: HashMap<ContentKey, Weak<GpuBufferProxy<B>>>,
    shapes: HashMap<ContentKey, Weak<ShapeProxy<B>>>,
}

impl<B: GpuBackend> ProxyRegistry<B> {
    pub(crate) fn new() -> Self {
        Self {
            textures: HashMap::new(),
            render_targets: HashMap::new(),
            buffers: HashMap::new(),
            shapes: HashMap::new(),
        }
    }

    pub(crate) fn find_texture(&mut self, key: &ContentKey) -> Option<Arc<dyn TextureProxy<B>>> {
        find(&mut self.textures, key)
    }

    pub(crate) fn find_render_target(&mut self, key: &ContentKey) -> Option<Arc<dyn RenderTargetProxy<B>>> {
        find(&mut self.render_targets, key)
    }

    pub(crate) fn find_buffer(&mut self, key: &ContentKey) -> Option<Arc<GpuBufferProxy<B>>> {
        find(&mut self.buffers, key)
    }

    pub(crate) fn find_shape(&mut self, key: &ContentKey) -> Option<Arc<ShapeProxy<B>>> {
        find(&mut self.shapes, key)
    }

    pub(crate) fn register_texture(&mut self, key: &ContentKey, proxy: &Arc<dyn TextureProxy<B>>) {
        register(&mut self.textures, key, Arc::downgrade(proxy));
    }

    pub(crate) fn register_render_target(&mut self, key: &ContentKey, proxy: &Arc<dyn RenderTargetProxy<B>>) {
        register(&mut self.render_targets, key, Arc::downgrade(proxy));
    }

    pub(crate) fn register_buffer(&mut self, key: &ContentKey, proxy: &Arc<GpuBufferProxy<B>>) {
        register(&mut self.buffers, key, Arc::downgrade(proxy));
    }

    pub(crate) fn register_shape(&mut self, key: &ContentKey, proxy: &Arc<ShapeProxy<B>>) {
        register(&mut self.shapes, key, Arc::downgrade(proxy));
    }

    pub(crate) fn purge_expired(&mut self) -> usize {
        let before = self.len();
        self.textures.retain(|_, weak| weak.strong_count() > 0);
        self.render_targets.retain(|_, weak| weak.strong_count() > 0);
        self.buffers.retain(|_, weak| weak.strong_count() > 0);
        self.shapes.retain(|_, weak| weak.strong_count() > 0);
        before - self.len()
    }

    pub(crate) fn clear(&mut self) {
        self.textures.clear();
        self.render_targets.clear();
        self.buffers.clear();
        self.shapes.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.textures.len() + self.render_targets.len() + self.buffers.len() + self.shapes.len()
    }
}

fn find<T: ?Sized>(map: &mut HashMap<ContentKey, Weak<T>>, key: &ContentKey) -> Option<Arc<T>> {
    if !key.is_valid() {
        return None;
    }
    let weak = map.get(key)?;
    match weak.upgrade() {
        Some(proxy) => Some(proxy),
        None => {
            map.remove(key);
            None
        }
    }
}

fn register<T: ?Sized>(map: &mut HashMap<ContentKey, Weak<T>>, key: &ContentKey, proxy: Weak<T>) {
    if !key.is_valid() {
        return;
    }
    let previous = map.insert(key.clone(), proxy);
    debug_assert!(
        previous.is_none_or(|weak| weak.strong_count() == 0),
        "a live proxy is already registered under this key"
    );
}
