//! In-memory backend for unit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::{BufferUsage, GpuBackend, NativeResource, PixelFormat, TextureDescriptor};
use crate::source::ImageBuffer;

/// Counters shared by a [`RecordingBackend`] and every handle it creates.
#[derive(Debug, Default)]
pub(crate) struct BackendStats {
    textures_created: AtomicUsize,
    textures_released: AtomicUsize,
    buffers_created: AtomicUsize,
    buffers_released: AtomicUsize,
    texture_writes: AtomicUsize,
    buffer_writes: AtomicUsize,
    copies: AtomicUsize,
}

impl BackendStats {
    pub(crate) fn textures_created(&self) -> usize {
        self.textures_created.load(Ordering::SeqCst)
    }

    pub(crate) fn textures_released(&self) -> usize {
        self.textures_released.load(Ordering::SeqCst)
    }

    pub(crate) fn buffers_created(&self) -> usize {
        self.buffers_created.load(Ordering::SeqCst)
    }

    pub(crate) fn buffers_released(&self) -> usize {
        self.buffers_released.load(Ordering::SeqCst)
    }

    pub(crate) fn texture_writes(&self) -> usize {
        self.texture_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn buffer_writes(&self) -> usize {
        self.buffer_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub(crate) struct FakeTexture {
    pub(crate) id: u64,
    pub(crate) desc: TextureDescriptor,
    /// Last image written or copied in.
    pub(crate) contents: Mutex<Option<ImageBuffer>>,
    stats: Arc<BackendStats>,
}

impl NativeResource for FakeTexture {
    fn release(&self) {
        self.stats.textures_released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub(crate) struct FakeBuffer {
    pub(crate) id: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) contents: Mutex<Vec<u8>>,
    stats: Arc<BackendStats>,
}

impl NativeResource for FakeBuffer {
    fn release(&self) {
        self.stats.buffers_released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A [`GpuBackend`] that keeps everything in memory and counts calls.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    stats: Arc<BackendStats>,
    next_id: AtomicU64,
    max_texture_size: u32,
    max_samples: u32,
    non_renderable: Vec<PixelFormat>,
    device_lost: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self {
            stats: Arc::new(BackendStats::default()),
            next_id: AtomicU64::new(1),
            max_texture_size: 4096,
            max_samples: 4,
            non_renderable: vec![PixelFormat::Gray8],
            device_lost: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub(crate) fn stats(&self) -> Arc<BackendStats> {
        Arc::clone(&self.stats)
    }

    pub(crate) fn lose_device(&self) {
        self.device_lost.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl GpuBackend for RecordingBackend {
    type Texture = FakeTexture;
    type Buffer = FakeBuffer;

    fn create_texture(&self, desc: &TextureDescriptor) -> Option<FakeTexture> {
        if desc.width == 0 || desc.height == 0 || desc.width.max(desc.height) > self.max_texture_size {
            return None;
        }
        self.stats.textures_created.fetch_add(1, Ordering::SeqCst);
        Some(FakeTexture {
            id: self.next_id(),
            desc: *desc,
            contents: Mutex::new(None),
            stats: Arc::clone(&self.stats),
        })
    }

    fn create_buffer(&self, size: usize, usage: BufferUsage) -> Option<FakeBuffer> {
        if size == 0 {
            return None;
        }
        self.stats.buffers_created.fetch_add(1, Ordering::SeqCst);
        Some(FakeBuffer {
            id: self.next_id(),
            usage,
            contents: Mutex::new(vec![0; size]),
            stats: Arc::clone(&self.stats),
        })
    }

    fn write_texture(&self, texture: &FakeTexture, image: &ImageBuffer) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.stats.texture_writes.fetch_add(1, Ordering::SeqCst);
        *texture.contents.lock().unwrap() = Some(image.clone());
        true
    }

    fn write_buffer(&self, buffer: &FakeBuffer, offset: usize, bytes: &[u8]) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        let mut contents = buffer.contents.lock().unwrap();
        let Some(dst) = contents.get_mut(offset..offset + bytes.len()) else {
            return false;
        };
        dst.copy_from_slice(bytes);
        self.stats.buffer_writes.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn copy_texture(&self, src: &FakeTexture, dst: &FakeTexture, _width: u32, _height: u32) -> bool {
        self.stats.copies.fetch_add(1, Ordering::SeqCst);
        let copied = src.contents.lock().unwrap().clone();
        *dst.contents.lock().unwrap() = copied;
        true
    }

    fn is_format_renderable(&self, format: PixelFormat) -> bool {
        !self.non_renderable.contains(&format)
    }

    fn sample_count(&self, requested: u32, _format: PixelFormat) -> u32 {
        if requested <= 1 || requested > self.max_samples {
            1
        } else {
            requested.next_power_of_two().min(self.max_samples)
        }
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::SeqCst)
    }
}
