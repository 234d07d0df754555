use crate::backend::PixelFormat;

/// Dimensions and layout of a pixel buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Bytes between the start of consecutive rows (>= `width * bpp`).
    pub row_bytes: usize,
}

impl ImageInfo {
    /// Tightly packed layout.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            row_bytes: width as usize * format.bytes_per_pixel(),
        }
    }

    pub fn with_row_bytes(mut self, row_bytes: usize) -> Self {
        self.row_bytes = row_bytes;
        self
    }

    #[inline]
    pub fn byte_size(&self) -> usize {
        self.row_bytes * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Decoded pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    info: ImageInfo,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Returns `None` when `pixels` is too short for `info` or the row stride
    /// is smaller than a packed row.
    pub fn from_pixels(info: ImageInfo, pixels: Vec<u8>) -> Option<Self> {
        let min_row = info.width as usize * info.format.bytes_per_pixel();
        if info.row_bytes < min_row || pixels.len() < info.byte_size() {
            return None;
        }
        Some(Self { info, pixels })
    }

    #[inline]
    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.info.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.info.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.info.format
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.info.row_bytes
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    #[inline]
    pub fn is_alpha_only(&self) -> bool {
        self.info.format.is_alpha_only()
    }
}

/// Lazily decoded image content (codecs, procedural images).
pub trait ImageGenerator: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn is_alpha_only(&self) -> bool {
        false
    }

    fn format(&self) -> PixelFormat {
        if self.is_alpha_only() { PixelFormat::Alpha8 } else { PixelFormat::Rgba8888 }
    }

    /// Whether `generate` may run on a worker thread.
    fn async_support(&self) -> bool {
        true
    }

    /// Produces the pixels, or `None` on decode failure.
    fn generate(&self) -> Option<ImageBuffer>;
}
