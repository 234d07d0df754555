use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::source::ImageBuffer;

use super::{BufferUsage, GpuBackend, NativeResource, PixelFormat, TextureDescriptor};

/// Initialization parameters for [`WgpuBackend::new`].
///
/// Keep this structure minimal. Add flags only when a concrete platform or
/// backend requirement exists.
#[derive(Debug, Clone)]
pub struct WgpuBackendInit {
    /// Adapter preference. High performance is the usual choice for rendering.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Allow the software fallback adapter (CI, headless servers).
    pub force_fallback_adapter: bool,
}

impl Default for WgpuBackendInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            force_fallback_adapter: false,
        }
    }
}

impl NativeResource for wgpu::Texture {
    fn release(&self) {
        self.destroy();
    }
}

impl NativeResource for wgpu::Buffer {
    fn release(&self) {
        self.destroy();
    }
}

/// [`GpuBackend`] over wgpu.
///
/// Owns the adapter/device/queue triple. Device loss is reported by the
/// device-lost callback and surfaced through [`GpuBackend::is_device_lost`].
pub struct WgpuBackend {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    device_lost: Arc<AtomicBool>,
}

impl WgpuBackend {
    /// Creates a headless backend (no surface).
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: WgpuBackendInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self::from_parts(adapter, device, queue))
    }

    /// Blocking variant of [`new`](Self::new).
    pub fn new_blocking(init: WgpuBackendInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Wraps objects created elsewhere (e.g. by the windowing layer).
    pub fn from_parts(adapter: wgpu::Adapter, device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let device_lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&device_lost);
        device.set_device_lost_callback(move |reason, message| {
            log::warn!("wgpu device lost ({reason:?}): {message}");
            flag.store(true, Ordering::Release);
        });

        Self {
            adapter,
            device,
            queue,
            device_lost,
        }
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    fn format_features(&self, format: PixelFormat) -> wgpu::TextureFormatFeatures {
        self.adapter.get_texture_format_features(format.to_wgpu())
    }
}

impl GpuBackend for WgpuBackend {
    type Texture = wgpu::Texture;
    type Buffer = wgpu::Buffer;

    fn create_texture(&self, desc: &TextureDescriptor) -> Option<wgpu::Texture> {
        let max = self.max_texture_size();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return None;
        }

        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC;
        if desc.render_target {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if desc.sample_count > 1 {
            // Multisampled textures can only be attachments.
            usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        }

        Some(self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_level_count,
            sample_count: desc.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format.to_wgpu(),
            usage,
            view_formats: &[],
        }))
    }

    fn create_buffer(&self, size: usize, usage: BufferUsage) -> Option<wgpu::Buffer> {
        if size == 0 {
            return None;
        }
        let size = align_to_copy(size) as u64;
        if size > self.device.limits().max_buffer_size {
            return None;
        }

        Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen buffer"),
            size,
            usage: usage.to_wgpu(),
            mapped_at_creation: false,
        }))
    }

    fn write_texture(&self, texture: &wgpu::Texture, image: &ImageBuffer) -> bool {
        if image.width() > texture.width() || image.height() > texture.height() {
            return false;
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.row_bytes() as u32),
                rows_per_image: Some(image.height()),
            },
            wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
        );
        true
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: usize, bytes: &[u8]) -> bool {
        let offset = offset as u64;
        if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return false;
        }
        let padded_len = align_to_copy(bytes.len());
        if offset + padded_len as u64 > buffer.size() {
            return false;
        }

        if padded_len == bytes.len() {
            self.queue.write_buffer(buffer, offset, bytes);
        } else {
            let mut padded = Vec::with_capacity(padded_len);
            padded.extend_from_slice(bytes);
            padded.resize(padded_len, 0);
            self.queue.write_buffer(buffer, offset, &padded);
        }
        true
    }

    fn copy_texture(&self, src: &wgpu::Texture, dst: &wgpu::Texture, width: u32, height: u32) -> bool {
        if src.format() != dst.format()
            || width > src.width().min(dst.width())
            || height > src.height().min(dst.height())
        {
            return false;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen flatten encoder"),
            });
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: src,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: dst,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));
        true
    }

    fn is_format_renderable(&self, format: PixelFormat) -> bool {
        self.format_features(format)
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
    }

    fn sample_count(&self, requested: u32, format: PixelFormat) -> u32 {
        let flags = self.format_features(format).flags;
        [1, 2, 4, 8, 16]
            .into_iter()
            .find(|&count| count >= requested && flags.sample_count_supported(count))
            .unwrap_or(1)
    }

    fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }
}

fn align_to_copy(len: usize) -> usize {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    len.div_ceil(align) * align
}
