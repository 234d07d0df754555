use std::sync::Arc;

use crate::backend::{BufferUsage, GpuBackend, ImageOrigin, PixelFormat, TextureDescriptor};
use crate::context::Context;
use crate::geom::{Color, Rect};
use crate::key::{ContentKey, KeyDomain};
use crate::proxy::{
    DefaultTextureProxy, ExternalRenderTargetProxy, FlattenTextureProxy, GpuBufferProxy, RenderTargetProxy,
    ShapeProxy, TextureProxy, TextureRenderTargetProxy, VertexBufferView, approximate_size,
};
use crate::resource::{RenderTarget, Texture};
use crate::source::{
    DataSource, FnSource, ImageBuffer, ImageGenerator, Shape, ShapeBuffer, ValueSource, VertexProvider, async_source,
};
use crate::task::{
    GpuBufferUploadTask, RenderTargetCreateTask, ShapeBufferUploadTask, TextureFlattenTask, TextureUploadTask,
};

use super::RenderTargetOptions;
use super::gradient::{gradient_key, is_valid_gradient, render_gradient};

/// Appended to shape keys rasterized without antialiasing.
const NON_ANTIALIAS_MARKER: u32 = 0x4e41_4141;

const F32_SIZE: usize = std::mem::size_of::<f32>();

/// Creates and deduplicates proxies for one context.
pub struct ProxyProvider<'a, B: GpuBackend> {
    context: &'a mut Context<B>,
}

impl<'a, B: GpuBackend> ProxyProvider<'a, B> {
    pub(crate) fn new(context: &'a mut Context<B>) -> Self {
        Self { context }
    }

    fn fits_device(&self, width: u32, height: u32) -> bool {
        let max = self.context.backend.max_texture_size();
        width > 0 && height > 0 && width <= max && height <= max
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Texture proxy uploading `image`. `None` for an empty or oversized
    /// image.
    pub fn create_texture_proxy(
        &mut self,
        key: &ContentKey,
        image: Arc<ImageBuffer>,
        mipmapped: bool,
    ) -> Option<Arc<dyn TextureProxy<B>>> {
        if image.is_empty() {
            log::debug!("rejected texture proxy: empty image");
            return None;
        }
        let (width, height, format) = (image.width(), image.height(), image.format());
        let source = Box::new(ValueSource::new(image));
        self.create_texture_proxy_from_source(key, source, width, height, format, mipmapped)
    }

    /// Texture proxy whose pixels are produced by `generator`, on a worker
    /// thread when the generator allows it and threading is enabled.
    pub fn create_texture_proxy_from_generator(
        &mut self,
        key: &ContentKey,
        generator: Arc<dyn ImageGenerator>,
        mipmapped: bool,
    ) -> Option<Arc<dyn TextureProxy<B>>> {
        let (width, height, format) = (generator.width(), generator.height(), generator.format());
        if !self.fits_device(width, height) {
            log::debug!("rejected texture proxy: generator size {width}x{height}");
            return None;
        }
        if let Some(proxy) = self.find_or_wrap_texture(key, width, height) {
            return Some(proxy);
        }
        let run_async = generator.async_support();
        let source: Box<dyn DataSource<ImageBuffer>> = Box::new(FnSource::new(move || generator.generate().map(Arc::new)));
        let source = if run_async {
            async_source(source, self.context.workers.as_ref())
        } else {
            source
        };
        self.create_texture_proxy_from_source(key, source, width, height, format, mipmapped)
    }

    pub fn create_texture_proxy_from_source(
        &mut self,
        key: &ContentKey,
        source: Box<dyn DataSource<ImageBuffer>>,
        width: u32,
        height: u32,
        format: PixelFormat,
        mipmapped: bool,
    ) -> Option<Arc<dyn TextureProxy<B>>> {
        if !self.fits_device(width, height) {
            log::debug!("rejected texture proxy: {width}x{height}");
            return None;
        }
        if let Some(proxy) = self.find_or_wrap_texture(key, width, height) {
            return Some(proxy);
        }

        let proxy = Arc::new(DefaultTextureProxy::new(key.clone(), width, height, format, mipmapped));
        let handle: Arc<dyn TextureProxy<B>> = proxy.clone();
        self.context.proxies.register_texture(key, &handle);
        self.context
            .drawing
            .add_resource_task(Box::new(TextureUploadTask::new(proxy, source)));
        Some(handle)
    }

    /// A registered proxy for `key`, or a cached texture wrapped into a new
    /// instantiated one. Checked before any content is produced.
    fn find_or_wrap_texture(&mut self, key: &ContentKey, width: u32, height: u32) -> Option<Arc<dyn TextureProxy<B>>> {
        if let Some(proxy) = self.context.proxies.find_texture(key) {
            return Some(proxy);
        }
        if !key.is_valid() {
            return None;
        }
        let texture = self.context.cache.find_texture(key)?;
        let proxy: Arc<dyn TextureProxy<B>> =
            Arc::new(DefaultTextureProxy::instantiated(key.clone(), width, height, texture));
        self.context.proxies.register_texture(key, &proxy);
        Some(proxy)
    }

    /// The live texture proxy registered under `key`.
    pub fn find_texture_proxy(&mut self, key: &ContentKey) -> Option<Arc<dyn TextureProxy<B>>> {
        self.context.proxies.find_texture(key)
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_gpu_buffer_proxy(
        &mut self,
        key: &ContentKey,
        data: Vec<u8>,
        usage: BufferUsage,
    ) -> Option<Arc<GpuBufferProxy<B>>> {
        if data.is_empty() {
            log::debug!("rejected buffer proxy: empty data");
            return None;
        }
        let size = data.len();
        let source = Box::new(ValueSource::new(Arc::new(data)));
        self.create_gpu_buffer_proxy_from_source(key, source, size, usage)
    }

    /// Buffer proxy filled from `source`. `size` is the expected byte length.
    pub fn create_gpu_buffer_proxy_from_source(
        &mut self,
        key: &ContentKey,
        source: Box<dyn DataSource<Vec<u8>>>,
        size: usize,
        usage: BufferUsage,
    ) -> Option<Arc<GpuBufferProxy<B>>> {
        if size == 0 {
            log::debug!("rejected buffer proxy: zero size");
            return None;
        }
        if let Some(proxy) = self.context.proxies.find_buffer(key) {
            return Some(proxy);
        }
        if key.is_valid() {
            if let Some(buffer) = self.context.cache.find_buffer(key) {
                let proxy = Arc::new(GpuBufferProxy::instantiated(key.clone(), buffer));
                self.context.proxies.register_buffer(key, &proxy);
                return Some(proxy);
            }
        }

        let proxy = Arc::new(GpuBufferProxy::new(key.clone(), size, usage));
        self.context.proxies.register_buffer(key, &proxy);
        self.context
            .drawing
            .add_resource_task(Box::new(GpuBufferUploadTask::new(proxy.clone(), source)));
        Some(proxy)
    }

    // ── render targets ────────────────────────────────────────────────────

    /// Offscreen render target, also usable as a texture.
    ///
    /// `None` for zero or oversized dimensions or a format the device cannot
    /// render to. With a valid `key`, identical requests share one target.
    pub fn create_render_target_proxy(
        &mut self,
        key: &ContentKey,
        width: u32,
        height: u32,
        options: RenderTargetOptions,
    ) -> Option<Arc<dyn RenderTargetProxy<B>>> {
        if !self.fits_device(width, height) {
            log::debug!("rejected render target: {width}x{height}");
            return None;
        }
        let backend = &self.context.backend;
        if !backend.is_format_renderable(options.format) {
            log::debug!("rejected render target: {:?} is not renderable", options.format);
            return None;
        }
        let sample_count = backend.sample_count(options.sample_count, options.format);
        let max = backend.max_texture_size();

        let key = render_target_key(key, width, height, sample_count, &options);
        if let Some(proxy) = self.context.proxies.find_render_target(&key) {
            return Some(proxy);
        }

        let (backing_width, backing_height) = if options.approximate_fit {
            (
                approximate_size(width).min(max).max(width),
                approximate_size(height).min(max).max(height),
            )
        } else {
            (width, height)
        };
        let proxy = Arc::new(TextureRenderTargetProxy::new(
            key.clone(),
            width,
            height,
            backing_width,
            backing_height,
            options.format,
            options.mipmapped,
            options.origin,
            sample_count,
        ));
        let as_target: Arc<dyn RenderTargetProxy<B>> = proxy.clone();
        let as_texture: Arc<dyn TextureProxy<B>> = proxy.clone();
        self.context.proxies.register_render_target(&key, &as_target);
        self.context.proxies.register_texture(&key, &as_texture);
        self.context
            .drawing
            .add_resource_task(Box::new(RenderTargetCreateTask::new(proxy)));
        Some(as_target)
    }

    /// Wraps a window-system texture. The engine never releases it.
    pub fn wrap_external_render_target(
        &mut self,
        texture: B::Texture,
        width: u32,
        height: u32,
        format: PixelFormat,
        origin: ImageOrigin,
    ) -> Option<Arc<dyn RenderTargetProxy<B>>> {
        if width == 0 || height == 0 {
            log::debug!("rejected external render target: {width}x{height}");
            return None;
        }
        let desc = TextureDescriptor::new(width, height, format).with_render_target(1);
        let cache = &self.context.cache;
        let texture = cache.wrap_texture(Texture::wrap_external(texture, desc, origin));
        let target = cache.wrap_render_target(RenderTarget::new(texture, None, 1));
        Some(Arc::new(ExternalRenderTargetProxy::new(target)))
    }

    // ── derived textures ──────────────────────────────────────────────────

    /// Proxy for a standalone copy of `source`'s contents.
    ///
    /// Until the copy is made it answers with `source`'s texture.
    pub fn flatten_texture_proxy(&mut self, source: Arc<dyn TextureProxy<B>>) -> Option<Arc<dyn TextureProxy<B>>> {
        let key = if source.key().is_valid() {
            let mut key = ContentKey::for_domain(KeyDomain::Flatten);
            key.append(source.key());
            key
        } else {
            ContentKey::new()
        };
        if let Some(proxy) = self.context.proxies.find_texture(&key) {
            return Some(proxy);
        }
        if key.is_valid() {
            if let Some(texture) = self.context.cache.find_texture(&key) {
                let proxy: Arc<dyn TextureProxy<B>> = Arc::new(DefaultTextureProxy::instantiated(
                    key.clone(),
                    source.width(),
                    source.height(),
                    texture,
                ));
                self.context.proxies.register_texture(&key, &proxy);
                return Some(proxy);
            }
        }

        let proxy = Arc::new(FlattenTextureProxy::new(key.clone(), source));
        let handle: Arc<dyn TextureProxy<B>> = proxy.clone();
        self.context.proxies.register_texture(&key, &handle);
        self.context
            .drawing
            .add_resource_task(Box::new(TextureFlattenTask::new(proxy)));
        Some(handle)
    }

    /// Rasterizes `shape` into triangles or a mask.
    ///
    /// Shapes entirely outside `clip_bounds` yield `None`. Inverse fills cover
    /// the clip, so the clip takes part in their key and their rasterization.
    /// Other shapes are rasterized within their own bounds.
    pub fn create_shape_proxy(
        &mut self,
        shape: Arc<dyn Shape>,
        antialias: bool,
        clip_bounds: Rect,
    ) -> Option<Arc<ShapeProxy<B>>> {
        let clip = clip_bounds.normalized();
        let inverse = shape.is_inverse_fill();
        let draw_bounds = if inverse {
            clip.round_out()
        } else {
            let bounds = shape.bounds().normalized();
            bounds.intersect(clip)?;
            bounds.round_out()
        };
        if !draw_bounds.is_finite() || draw_bounds.is_empty() {
            log::debug!("rejected shape proxy: empty draw bounds");
            return None;
        }
        let (width, height) = (draw_bounds.width() as u32, draw_bounds.height() as u32);
        if !self.fits_device(width, height) {
            log::debug!("rejected shape proxy: {width}x{height}");
            return None;
        }

        let key = shape_key(&*shape, antialias, inverse, clip);
        if let Some(proxy) = self.context.proxies.find_shape(&key) {
            return Some(proxy);
        }
        if key.is_valid() {
            let cached = if let Some(buffer) = self.context.cache.find_buffer(&key) {
                Some(ShapeProxy::from_parts(
                    key.clone(),
                    draw_bounds,
                    GpuBufferProxy::instantiated(key.clone(), buffer),
                    DefaultTextureProxy::new(key.clone(), width, height, PixelFormat::Alpha8, false),
                ))
            } else {
                self.context.cache.find_texture(&key).map(|texture| {
                    ShapeProxy::from_parts(
                        key.clone(),
                        draw_bounds,
                        GpuBufferProxy::new(key.clone(), 0, BufferUsage::Vertex),
                        DefaultTextureProxy::instantiated(key.clone(), width, height, texture),
                    )
                })
            };
            if let Some(proxy) = cached {
                let proxy = Arc::new(proxy);
                self.context.proxies.register_shape(&key, &proxy);
                return Some(proxy);
            }
        }

        let proxy = Arc::new(ShapeProxy::new(key.clone(), draw_bounds));
        self.context.proxies.register_shape(&key, &proxy);
        // Only inverse fills depend on the clip, and only they carry it in their key.
        let raster_bounds = if inverse { clip } else { draw_bounds };
        let source: Box<dyn DataSource<ShapeBuffer>> =
            Box::new(FnSource::new(move || shape.rasterize(antialias, raster_bounds).map(Arc::new)));
        let source = async_source(source, self.context.workers.as_ref());
        self.context
            .drawing
            .add_resource_task(Box::new(ShapeBufferUploadTask::new(proxy.clone(), source)));
        Some(proxy)
    }

    /// A `256 x 1` lookup texture for the given color stops.
    ///
    /// Needs at least two colors. `positions` is either empty (evenly spaced)
    /// or one non-decreasing position per color. Recently used gradients are
    /// kept alive in a bounded cache.
    pub fn create_gradient_proxy(&mut self, colors: &[Color], positions: &[f32]) -> Option<Arc<dyn TextureProxy<B>>> {
        if !is_valid_gradient(colors, positions) {
            log::debug!("rejected gradient: {} colors, {} positions", colors.len(), positions.len());
            return None;
        }
        let key = gradient_key(colors, positions);
        if let Some(proxy) = self.context.gradients.get(&key) {
            return Some(Arc::clone(proxy));
        }
        let image = render_gradient(colors, positions)?;
        let proxy = self.create_texture_proxy(&key, Arc::new(image), false)?;
        let evicted = self.context.gradients.insert(key, Arc::clone(&proxy));
        if !evicted.is_empty() {
            log::debug!("evicted {} gradients", evicted.len());
        }
        Some(proxy)
    }

    // ── shared vertex buffer ──────────────────────────────────────────────

    /// Packs `provider`'s vertices into the current shared block.
    ///
    /// A provider that does not fit flushes the block and starts a new one;
    /// one larger than a whole block gets a buffer of its own.
    pub fn create_shared_vertex_buffer(&mut self, provider: &dyn VertexProvider) -> Option<VertexBufferView<B>> {
        let count = provider.vertex_count();
        if count == 0 {
            return None;
        }
        let config = &self.context.config;
        let block_size = self
            .context
            .vertices
            .block_size(config.shared_vertex_block_floats, config.max_shared_vertex_block_floats);

        if count > block_size {
            let mut vertices = vec![0.0_f32; count];
            provider.get_vertices(&mut vertices);
            let bytes = bytemuck::cast_slice::<f32, u8>(&vertices).to_vec();
            let proxy = self.create_gpu_buffer_proxy(&ContentKey::new(), bytes, BufferUsage::Vertex)?;
            return Some(VertexBufferView::new(proxy, 0, count * F32_SIZE));
        }

        if !self.context.vertices.fits(count) {
            self.flush_shared_vertex_buffer();
            self.context.vertices.start(block_size);
        }
        let (proxy, offset) = self.context.vertices.append(provider, count)?;
        Some(VertexBufferView::new(proxy, offset * F32_SIZE, count * F32_SIZE))
    }

    /// Queues the upload of the current shared block, if any. Returns whether
    /// a task was queued.
    pub fn flush_shared_vertex_buffer(&mut self) -> bool {
        let Some((proxy, vertices)) = self.context.vertices.take() else {
            return false;
        };
        if vertices.is_empty() {
            return false;
        }
        let bytes = bytemuck::cast_slice::<f32, u8>(&vertices).to_vec();
        log::debug!("flushing shared vertex block ({} floats)", vertices.len());
        let source = Box::new(ValueSource::new(Arc::new(bytes)));
        self.context
            .drawing
            .add_resource_task(Box::new(GpuBufferUploadTask::new(proxy, source)));
        true
    }

    /// Starts a new frame: records this frame's usage for block sizing and
    /// discards a block that was never flushed.
    pub fn clear_shared_vertex_buffer(&mut self) {
        let discarded = self.context.vertices.end_frame();
        if discarded > 0 {
            log::warn!("discarded {discarded} unflushed shared vertex floats");
        }
    }

    // ── maintenance ───────────────────────────────────────────────────────

    /// Drops registry entries whose proxy is gone.
    pub fn purge_expired_proxies(&mut self) -> usize {
        self.context.proxies.purge_expired()
    }
}

fn render_target_key(
    key: &ContentKey,
    width: u32,
    height: u32,
    sample_count: u32,
    options: &RenderTargetOptions,
) -> ContentKey {
    if !key.is_valid() {
        return ContentKey::new();
    }
    // Logical size only: the backing store follows from it and the fit flag.
    let mut key = key.clone();
    key.reserve(6);
    key.write_u32(width);
    key.write_u32(height);
    key.write_u32(options.format.key_word());
    key.write_u32(sample_count);
    key.write_bool(options.mipmapped);
    key.write_bool(options.approximate_fit);
    key
}

fn shape_key(shape: &dyn Shape, antialias: bool, inverse: bool, clip: Rect) -> ContentKey {
    let mut key = ContentKey::for_domain(KeyDomain::Shape);
    let tag_len = key.len();
    shape.write_key(&mut key);
    if key.len() == tag_len {
        return ContentKey::new();
    }
    if !antialias {
        key.write_u32(NON_ANTIALIAS_MARKER);
    }
    if inverse {
        key.write_rect(clip);
    }
    key
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::{self, ThreadId};

    use super::*;
    use crate::context::{EngineConfig, FlushOutcome};
    use crate::return_queue::Shared;
    use crate::source::ImageInfo;
    use crate::testing::RecordingBackend;

    fn context() -> Context<RecordingBackend> {
        let config = EngineConfig {
            threading: false,
            ..EngineConfig::default()
        };
        Context::new(RecordingBackend::new(), config)
    }

    fn key(id: u32) -> ContentKey {
        let mut key = ContentKey::for_domain(KeyDomain::Texture);
        key.write_u32(id);
        key
    }

    fn image(width: u32, height: u32) -> Arc<ImageBuffer> {
        let info = ImageInfo::new(width, height, PixelFormat::Rgba8888);
        Arc::new(ImageBuffer::from_pixels(info, vec![9; info.byte_size()]).expect("valid image"))
    }

    struct TestShape {
        id: u32,
        inverse: bool,
        bounds: Rect,
        rasterized_in: Mutex<Vec<Rect>>,
    }

    impl TestShape {
        fn new(id: u32, inverse: bool) -> Self {
            Self {
                id,
                inverse,
                bounds: Rect::from_xywh(10.0, 10.0, 20.0, 20.0),
                rasterized_in: Mutex::new(Vec::new()),
            }
        }
    }

    impl Shape for TestShape {
        fn write_key(&self, key: &mut ContentKey) {
            key.write_u32(self.id);
        }

        fn is_inverse_fill(&self) -> bool {
            self.inverse
        }

        fn bounds(&self) -> Rect {
            self.bounds
        }

        fn rasterize(&self, _antialias: bool, bounds: Rect) -> Option<ShapeBuffer> {
            self.rasterized_in.lock().unwrap().push(bounds);
            Some(ShapeBuffer::Triangles(vec![0.0; 9]))
        }
    }

    fn shape(id: u32, inverse: bool) -> Arc<dyn Shape> {
        Arc::new(TestShape::new(id, inverse))
    }

    fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
    }

    // ── deduplication ─────────────────────────────────────────────────────

    #[test]
    fn same_buffer_key_returns_one_proxy_and_one_task() {
        let mut ctx = context();
        let k = key(1);
        let mut provider = ctx.proxy_provider();
        let first = provider.create_gpu_buffer_proxy(&k, vec![1, 2, 3], BufferUsage::Vertex).expect("proxy");
        let second = provider.create_gpu_buffer_proxy(&k, vec![1, 2, 3], BufferUsage::Vertex).expect("proxy");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.drawing_manager().count_tasks_for(&k), 1);
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 1);
    }

    #[test]
    fn same_texture_key_returns_one_proxy_and_one_task() {
        let mut ctx = context();
        let k = key(2);
        let first = ctx.proxy_provider().create_texture_proxy(&k, image(4, 4), false).expect("proxy");
        let second = ctx.proxy_provider().create_texture_proxy(&k, image(4, 4), false).expect("proxy");

        assert!(same(&first, &second));
        assert_eq!(ctx.drawing_manager().count_tasks_for(&k), 1);
        assert!(same(&ctx.proxy_provider().find_texture_proxy(&k).expect("registered"), &first));
    }

    #[test]
    fn uncached_requests_are_never_shared() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let a = provider.create_texture_proxy(&ContentKey::new(), image(4, 4), false).expect("proxy");
        let b = provider.create_texture_proxy(&ContentKey::new(), image(4, 4), false).expect("proxy");
        assert!(!same(&a, &b));
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 2);
    }

    #[test]
    fn cached_resource_is_wrapped_without_a_new_task() {
        let mut ctx = context();
        let k = key(3);
        let proxy = ctx.proxy_provider().create_texture_proxy(&k, image(4, 4), false).expect("proxy");
        assert!(matches!(ctx.flush(), FlushOutcome::Submitted(_)));
        let texture = proxy.get_texture().expect("materialized");
        drop(proxy);
        ctx.proxy_provider().purge_expired_proxies();

        let again = ctx.proxy_provider().create_texture_proxy(&k, image(4, 4), false).expect("proxy");
        assert!(again.is_instantiated());
        assert!(Shared::ptr_eq(&again.get_texture().expect("wrapped"), &texture));
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
        assert_eq!(ctx.backend().stats().textures_created(), 1);
    }

    // ── invalid input ─────────────────────────────────────────────────────

    #[test]
    fn empty_image_is_rejected_without_side_effects() {
        let mut ctx = context();
        let empty = Arc::new(
            ImageBuffer::from_pixels(ImageInfo::new(0, 0, PixelFormat::Rgba8888), Vec::new()).expect("empty image"),
        );
        assert!(ctx.proxy_provider().create_texture_proxy(&key(4), empty, false).is_none());
        assert!(ctx.proxy_provider().create_gpu_buffer_proxy(&key(4), Vec::new(), BufferUsage::Vertex).is_none());
        assert!(ctx.proxy_provider().find_texture_proxy(&key(4)).is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
        assert_eq!(ctx.resource_cache().texture_count(), 0);
    }

    #[test]
    fn oversized_texture_is_rejected() {
        let mut ctx = context();
        let source = Box::new(FnSource::new(|| None::<Arc<ImageBuffer>>));
        let proxy = ctx
            .proxy_provider()
            .create_texture_proxy_from_source(&key(5), source, 8192, 8, PixelFormat::Rgba8888, false);
        assert!(proxy.is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
    }

    #[test]
    fn failed_source_leaves_proxy_unmaterialized() {
        let mut ctx = context();
        let source = Box::new(FnSource::new(|| None::<Arc<ImageBuffer>>));
        let proxy = ctx
            .proxy_provider()
            .create_texture_proxy_from_source(&key(6), source, 8, 8, PixelFormat::Rgba8888, false)
            .expect("proxy");
        ctx.flush();
        assert!(proxy.get_texture().is_none());
        ctx.flush();
        assert!(proxy.get_texture().is_none());
    }

    // ── generators ────────────────────────────────────────────────────────

    #[derive(Default)]
    struct ThreadRecordingGenerator {
        ran_on: Mutex<Option<ThreadId>>,
        calls: AtomicUsize,
    }

    impl ImageGenerator for ThreadRecordingGenerator {
        fn width(&self) -> u32 {
            2
        }

        fn height(&self) -> u32 {
            2
        }

        fn generate(&self) -> Option<ImageBuffer> {
            *self.ran_on.lock().unwrap() = Some(thread::current().id());
            self.calls.fetch_add(1, Ordering::SeqCst);
            ImageBuffer::from_pixels(ImageInfo::new(2, 2, PixelFormat::Rgba8888), vec![0; 16])
        }
    }

    #[test]
    fn generators_run_on_workers_when_threading_is_enabled() {
        let config = EngineConfig {
            threading: true,
            worker_threads: 1,
            ..EngineConfig::default()
        };
        let mut ctx = Context::new(RecordingBackend::new(), config);
        let generator = Arc::new(ThreadRecordingGenerator::default());
        let proxy = ctx
            .proxy_provider()
            .create_texture_proxy_from_generator(&key(7), generator.clone(), false)
            .expect("proxy");

        ctx.flush();
        assert!(proxy.is_instantiated());
        let ran_on = generator.ran_on.lock().unwrap().expect("generated");
        assert_ne!(ran_on, thread::current().id());
    }

    #[test]
    fn cached_generator_output_is_not_generated_again() {
        let config = EngineConfig {
            threading: true,
            worker_threads: 1,
            ..EngineConfig::default()
        };
        let mut ctx = Context::new(RecordingBackend::new(), config);
        let generator = Arc::new(ThreadRecordingGenerator::default());
        let first = ctx
            .proxy_provider()
            .create_texture_proxy_from_generator(&key(8), generator.clone(), false)
            .expect("proxy");
        ctx.flush();
        assert!(first.is_instantiated());
        drop(first);
        ctx.proxy_provider().purge_expired_proxies();

        let again = ctx
            .proxy_provider()
            .create_texture_proxy_from_generator(&key(8), generator.clone(), false)
            .expect("proxy");
        assert!(again.is_instantiated());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    // ── render targets ────────────────────────────────────────────────────

    #[test]
    fn render_target_validation() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let gray = RenderTargetOptions {
            format: PixelFormat::Gray8,
            ..RenderTargetOptions::default()
        };
        assert!(provider.create_render_target_proxy(&key(8), 64, 64, gray).is_none());
        assert!(provider.create_render_target_proxy(&key(8), 0, 64, RenderTargetOptions::default()).is_none());
        assert!(provider.create_render_target_proxy(&key(8), 64, 5000, RenderTargetOptions::default()).is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
    }

    #[test]
    fn approximate_fit_rounds_the_backing_store_only() {
        let mut ctx = context();
        let options = RenderTargetOptions {
            approximate_fit: true,
            sample_count: 3,
            ..RenderTargetOptions::default()
        };
        let target = ctx
            .proxy_provider()
            .create_render_target_proxy(&key(9), 1025, 17, options)
            .expect("proxy");
        assert_eq!((target.width(), target.height()), (1025, 17));
        assert_eq!(target.sample_count(), 4);

        let texture = target.clone().as_texture_proxy().expect("texture role");
        assert_eq!((texture.backing_store_width(), texture.backing_store_height()), (1536, 32));

        ctx.flush();
        let realized = target.get_render_target().expect("materialized");
        assert_eq!((realized.width(), realized.height()), (1536, 32));
    }

    #[test]
    fn render_target_keys_include_the_fit_mode() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let exact = RenderTargetOptions::default();
        let approx = RenderTargetOptions {
            approximate_fit: true,
            ..exact
        };
        let a = provider.create_render_target_proxy(&key(10), 100, 100, exact).expect("proxy");
        let b = provider.create_render_target_proxy(&key(10), 100, 100, exact).expect("proxy");
        let c = provider.create_render_target_proxy(&key(10), 100, 100, approx).expect("proxy");
        assert!(same(&a, &b));
        assert!(!same(&a, &c));
    }

    #[test]
    fn external_targets_are_ready_and_never_released() {
        let mut ctx = context();
        let desc = TextureDescriptor::new(640, 480, PixelFormat::Bgra8888);
        let native = ctx.backend().create_texture(&desc).expect("fake texture");
        let target = ctx
            .proxy_provider()
            .wrap_external_render_target(native, 640, 480, PixelFormat::Bgra8888, ImageOrigin::BottomLeft)
            .expect("proxy");

        assert!(target.externally_owned());
        assert!(target.get_render_target().is_some());
        assert!(target.clone().as_texture_proxy().is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);

        drop(target);
        ctx.flush();
        assert_eq!(ctx.backend().stats().textures_released(), 0);
    }

    // ── flatten ───────────────────────────────────────────────────────────

    #[test]
    fn flatten_answers_with_the_source_until_copied() {
        let mut ctx = context();
        let source = ctx.proxy_provider().create_texture_proxy(&key(11), image(6, 3), true).expect("proxy");
        let flat = ctx.proxy_provider().flatten_texture_proxy(source.clone()).expect("flatten");

        assert_eq!((flat.width(), flat.height()), (6, 3));
        assert!(flat.has_mipmaps());
        assert!(flat.get_texture().is_none());

        // Upload and flatten run in the same flush, in submission order.
        ctx.flush();
        let original = source.get_texture().expect("source materialized");
        let copy = flat.get_texture().expect("flattened");
        assert!(!Shared::ptr_eq(&original, &copy));
        assert_eq!(ctx.backend().stats().copies(), 1);
        assert_eq!(*copy.native().contents.lock().unwrap(), Some((*image(6, 3)).clone()));
    }

    #[test]
    fn flatten_of_a_materialized_source_reports_its_texture() {
        let mut ctx = context();
        let source = ctx.proxy_provider().create_texture_proxy(&key(12), image(4, 4), false).expect("proxy");
        ctx.flush();
        let flat = ctx.proxy_provider().flatten_texture_proxy(source.clone()).expect("flatten");

        let before = flat.get_texture().expect("source texture");
        assert!(Shared::ptr_eq(&before, &source.get_texture().expect("source")));
        ctx.flush();
        let after = flat.get_texture().expect("flattened");
        assert!(!Shared::ptr_eq(&before, &after));
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn inverse_fill_keys_depend_on_the_clip() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let a = provider
            .create_shape_proxy(shape(1, true), true, Rect::from_wh(100.0, 100.0))
            .expect("proxy");
        let b = provider
            .create_shape_proxy(shape(1, true), true, Rect::from_wh(50.0, 50.0))
            .expect("proxy");
        assert_ne!(a.key(), b.key());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn regular_fill_keys_ignore_the_clip() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let a = provider
            .create_shape_proxy(shape(2, false), true, Rect::from_wh(100.0, 100.0))
            .expect("proxy");
        let b = provider
            .create_shape_proxy(shape(2, false), true, Rect::from_wh(50.0, 50.0))
            .expect("proxy");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.draw_bounds(), Rect::from_xywh(10.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn regular_fills_are_rasterized_within_their_own_bounds() {
        let mut ctx = context();
        let recorded = Arc::new(TestShape::new(6, false));
        let as_shape: Arc<dyn Shape> = recorded.clone();
        let narrow = ctx
            .proxy_provider()
            .create_shape_proxy(as_shape.clone(), true, Rect::from_wh(15.0, 15.0))
            .expect("proxy");
        let wide = ctx
            .proxy_provider()
            .create_shape_proxy(as_shape, true, Rect::from_wh(1000.0, 1000.0))
            .expect("proxy");
        assert!(Arc::ptr_eq(&narrow, &wide));

        ctx.flush();
        assert_eq!(*recorded.rasterized_in.lock().unwrap(), vec![Rect::from_xywh(10.0, 10.0, 20.0, 20.0)]);
    }

    #[test]
    fn inverse_fills_are_rasterized_within_the_clip() {
        let mut ctx = context();
        let recorded = Arc::new(TestShape::new(7, true));
        let clip = Rect::from_wh(64.0, 48.0);
        let _proxy = ctx.proxy_provider().create_shape_proxy(recorded.clone(), true, clip).expect("proxy");

        ctx.flush();
        assert_eq!(*recorded.rasterized_in.lock().unwrap(), vec![clip]);
    }

    #[test]
    fn non_antialiased_shapes_get_their_own_key() {
        let mut ctx = context();
        let mut provider = ctx.proxy_provider();
        let clip = Rect::from_wh(100.0, 100.0);
        let aa = provider.create_shape_proxy(shape(3, false), true, clip).expect("proxy");
        let aliased = provider.create_shape_proxy(shape(3, false), false, clip).expect("proxy");
        assert_ne!(aa.key(), aliased.key());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 2);
    }

    #[test]
    fn culled_shapes_yield_nothing() {
        let mut ctx = context();
        let clip = Rect::from_xywh(200.0, 200.0, 10.0, 10.0);
        assert!(ctx.proxy_provider().create_shape_proxy(shape(4, false), true, clip).is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
    }

    #[test]
    fn shape_triangles_materialize_on_flush() {
        let mut ctx = context();
        let proxy = ctx
            .proxy_provider()
            .create_shape_proxy(shape(5, false), true, Rect::from_wh(100.0, 100.0))
            .expect("proxy");
        ctx.flush();
        assert_eq!(proxy.vertex_count(), 3);
    }

    // ── gradients ─────────────────────────────────────────────────────────

    #[test]
    fn gradients_are_shared_and_bounded() {
        let mut ctx = context();
        let stops = [Color::black(), Color::white()];
        let first = ctx.proxy_provider().create_gradient_proxy(&stops, &[]).expect("gradient");
        let again = ctx.proxy_provider().create_gradient_proxy(&stops, &[]).expect("gradient");
        assert!(same(&first, &again));
        assert_eq!((first.width(), first.height()), (256, 1));

        for i in 0..40 {
            let color = Color::new(i as f32 / 40.0, 0.0, 0.0, 1.0);
            ctx.proxy_provider().create_gradient_proxy(&[color, Color::white()], &[]).expect("gradient");
        }
        assert_eq!(ctx.gradient_cache_len(), ctx.config().gradient_cache_limit);
    }

    #[test]
    fn mismatched_gradient_stops_are_rejected() {
        let mut ctx = context();
        assert!(ctx.proxy_provider().create_gradient_proxy(&[Color::black()], &[0.0, 1.0]).is_none());
        assert!(ctx.proxy_provider().create_gradient_proxy(&[], &[]).is_none());
        assert!(ctx.proxy_provider().create_gradient_proxy(&[Color::white()], &[]).is_none());
        let stops = [Color::black(), Color::white()];
        assert!(ctx.proxy_provider().create_gradient_proxy(&stops, &[1.0, 0.0]).is_none());
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
    }

    // ── shared vertex buffer ──────────────────────────────────────────────

    fn small_block_context() -> Context<RecordingBackend> {
        let config = EngineConfig {
            threading: false,
            shared_vertex_block_floats: 8,
            max_shared_vertex_block_floats: 16,
            ..EngineConfig::default()
        };
        Context::new(RecordingBackend::new(), config)
    }

    #[test]
    fn small_providers_share_a_block() {
        let mut ctx = small_block_context();
        let mut provider = ctx.proxy_provider();
        let a = provider.create_shared_vertex_buffer(&vec![1.0_f32; 3]).expect("view");
        let b = provider.create_shared_vertex_buffer(&vec![2.0_f32; 4]).expect("view");

        assert!(Arc::ptr_eq(a.proxy(), b.proxy()));
        assert_eq!((a.offset(), a.size()), (0, 12));
        assert_eq!((b.offset(), b.size()), (12, 16));
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);

        ctx.flush();
        let buffer = a.proxy().get_buffer().expect("uploaded");
        let contents = buffer.native().contents.lock().unwrap().clone();
        let floats: Vec<f32> = contents
            .chunks_exact(F32_SIZE)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(floats, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn overflowing_provider_flushes_the_block() {
        let mut ctx = small_block_context();
        let mut provider = ctx.proxy_provider();
        let a = provider.create_shared_vertex_buffer(&vec![0.0_f32; 6]).expect("view");
        let b = provider.create_shared_vertex_buffer(&vec![0.0_f32; 6]).expect("view");

        assert!(!Arc::ptr_eq(a.proxy(), b.proxy()));
        assert_eq!(b.offset(), 0);
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 1);
    }

    #[test]
    fn oversized_provider_gets_its_own_buffer() {
        let mut ctx = small_block_context();
        let mut provider = ctx.proxy_provider();
        let small = provider.create_shared_vertex_buffer(&vec![0.0_f32; 2]).expect("view");
        let big = provider.create_shared_vertex_buffer(&vec![0.0_f32; 20]).expect("view");

        assert!(!Arc::ptr_eq(small.proxy(), big.proxy()));
        assert_eq!(big.size(), 80);
        // The block stays open; only the dedicated buffer was queued.
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 1);
        assert!(provider_block_open(&mut ctx, 2));
    }

    fn provider_block_open(ctx: &mut Context<RecordingBackend>, floats: usize) -> bool {
        let view = ctx.proxy_provider().create_shared_vertex_buffer(&vec![0.0_f32; 1]).expect("view");
        view.offset() == floats * F32_SIZE
    }

    #[test]
    fn block_size_follows_the_running_maximum() {
        let mut ctx = small_block_context();
        for _ in 0..3 {
            ctx.proxy_provider().create_shared_vertex_buffer(&vec![0.0_f32; 5]).expect("view");
        }
        ctx.flush();

        // 15 floats were used last frame, so one block now holds all of them.
        let mut provider = ctx.proxy_provider();
        let first = provider.create_shared_vertex_buffer(&vec![0.0_f32; 5]).expect("view");
        for _ in 0..2 {
            let view = provider.create_shared_vertex_buffer(&vec![0.0_f32; 5]).expect("view");
            assert!(Arc::ptr_eq(first.proxy(), view.proxy()));
        }
        assert_eq!(ctx.drawing_manager().pending_resource_tasks(), 0);
    }

    #[test]
    fn empty_providers_are_rejected() {
        let mut ctx = small_block_context();
        assert!(ctx.proxy_provider().create_shared_vertex_buffer(&Vec::<f32>::new()).is_none());
    }
}
