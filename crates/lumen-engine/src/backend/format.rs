/// Pixel formats understood by the resource layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// Single 8-bit coverage channel (masks, glyphs).
    Alpha8,
    /// Single 8-bit luminance channel.
    Gray8,
    Rg88,
    Rgba8888,
    Bgra8888,
    /// Half-float RGBA.
    RgbaF16,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Alpha8 | Self::Gray8 => 1,
            Self::Rg88 => 2,
            Self::Rgba8888 | Self::Bgra8888 => 4,
            Self::RgbaF16 => 8,
        }
    }

    #[inline]
    pub const fn is_alpha_only(self) -> bool {
        matches!(self, Self::Alpha8)
    }

    /// Stable word used when a format participates in a cache key.
    #[inline]
    pub const fn key_word(self) -> u32 {
        self as u32
    }

    pub fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Alpha8 | Self::Gray8 => wgpu::TextureFormat::R8Unorm,
            Self::Rg88 => wgpu::TextureFormat::Rg8Unorm,
            Self::Rgba8888 => wgpu::TextureFormat::Rgba8Unorm,
            Self::Bgra8888 => wgpu::TextureFormat::Bgra8Unorm,
            Self::RgbaF16 => wgpu::TextureFormat::Rgba16Float,
        }
    }
}
