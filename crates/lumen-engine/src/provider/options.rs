use crate::backend::{ImageOrigin, PixelFormat};

/// Parameters of an offscreen render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTargetOptions {
    /// Must be renderable on the current device.
    pub format: PixelFormat,

    /// Requested MSAA sample count.
    ///
    /// Clamped to what the device supports for `format`; 1 disables MSAA.
    pub sample_count: u32,

    pub mipmapped: bool,

    pub origin: ImageOrigin,

    /// Round the backing store up with
    /// [`approximate_size`](crate::proxy::approximate_size) so that it can be
    /// reused for similar sizes.
    pub approximate_fit: bool,
}

impl Default for RenderTargetOptions {
    fn default() -> Self {
        Self {
            format: PixelFormat::Rgba8888,
            sample_count: 1,
            mipmapped: false,
            origin: ImageOrigin::TopLeft,
            approximate_fit: false,
        }
    }
}
