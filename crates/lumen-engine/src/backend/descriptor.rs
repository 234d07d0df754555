use super::PixelFormat;

/// Vertical orientation of texture rows.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ImageOrigin {
    #[default]
    TopLeft,
    /// Typical for window-system framebuffers on GL-like APIs.
    BottomLeft,
}

/// Intended binding of a GPU buffer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    #[default]
    Vertex,
    Index,
    Uniform,
}

impl BufferUsage {
    pub(crate) fn to_wgpu(self) -> wgpu::BufferUsages {
        let binding = match self {
            Self::Vertex => wgpu::BufferUsages::VERTEX,
            Self::Index => wgpu::BufferUsages::INDEX,
            Self::Uniform => wgpu::BufferUsages::UNIFORM,
        };
        binding | wgpu::BufferUsages::COPY_DST
    }
}

/// Shape of a texture to allocate. Dimensions are backing-store dimensions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mip_level_count: u32,
    pub sample_count: u32,
    /// Texture may be bound as a colour attachment.
    pub render_target: bool,
}

impl TextureDescriptor {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            mip_level_count: 1,
            sample_count: 1,
            render_target: false,
        }
    }

    /// Requests a full mip chain when `mipmapped` is set.
    pub fn with_mipmaps(mut self, mipmapped: bool) -> Self {
        self.mip_level_count = if mipmapped { mip_levels_for(self.width, self.height) } else { 1 };
        self
    }

    pub fn with_render_target(mut self, sample_count: u32) -> Self {
        self.render_target = true;
        self.sample_count = sample_count.max(1);
        self
    }

    #[inline]
    pub fn has_mipmaps(&self) -> bool {
        self.mip_level_count > 1
    }
}

/// Number of levels in a full mip chain for the given base size.
pub(crate) fn mip_levels_for(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}
