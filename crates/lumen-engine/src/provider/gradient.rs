use crate::backend::PixelFormat;
use crate::geom::Color;
use crate::key::{ContentKey, KeyDomain};
use crate::source::{ImageBuffer, ImageInfo};

/// Width of a gradient lookup texture.
pub(crate) const GRADIENT_WIDTH: u32 = 256;

/// At least two finite colors, with either no positions (evenly spaced) or
/// one finite, non-decreasing position per color.
pub(crate) fn is_valid_gradient(colors: &[Color], positions: &[f32]) -> bool {
    colors.len() >= 2
        && (positions.is_empty() || positions.len() == colors.len())
        && colors.iter().all(|c| c.is_finite())
        && positions.iter().all(|p| p.is_finite())
        && positions.windows(2).all(|pair| pair[0] <= pair[1])
}

pub(crate) fn gradient_key(colors: &[Color], positions: &[f32]) -> ContentKey {
    let mut key = ContentKey::for_domain(KeyDomain::Gradient);
    key.reserve(2 + colors.len() * 4 + positions.len());
    key.write_u32(colors.len() as u32);
    key.write_bool(!positions.is_empty());
    for color in colors {
        key.write_f32(color.r);
        key.write_f32(color.g);
        key.write_f32(color.b);
        key.write_f32(color.a);
    }
    for &position in positions {
        key.write_f32(position);
    }
    key
}

/// Renders the stops into a `GRADIENT_WIDTH x 1` premultiplied RGBA row.
pub(crate) fn render_gradient(colors: &[Color], positions: &[f32]) -> Option<ImageBuffer> {
    let stops = normalized_stops(colors.len(), positions);
    let mut pixels = Vec::with_capacity(GRADIENT_WIDTH as usize * 4);
    for x in 0..GRADIENT_WIDTH {
        let t = (x as f32 + 0.5) / GRADIENT_WIDTH as f32;
        pixels.extend_from_slice(&sample(colors, &stops, t).to_premultiplied_rgba8());
    }
    ImageBuffer::from_pixels(ImageInfo::new(GRADIENT_WIDTH, 1, PixelFormat::Rgba8888), pixels)
}

/// Stop positions clamped to `[0, 1]`.
fn normalized_stops(count: usize, positions: &[f32]) -> Vec<f32> {
    if positions.is_empty() {
        let last = count.saturating_sub(1).max(1) as f32;
        return (0..count).map(|i| i as f32 / last).collect();
    }
    positions.iter().map(|p| p.clamp(0.0, 1.0)).collect()
}

fn sample(colors: &[Color], stops: &[f32], t: f32) -> Color {
    let last = colors.len() - 1;
    if t <= stops[0] {
        return colors[0];
    }
    if t >= stops[last] {
        return colors[last];
    }
    let upper = stops.iter().position(|&s| s >= t).unwrap_or(last);
    let lower = upper.saturating_sub(1);
    let span = stops[upper] - stops[lower];
    if span <= f32::EPSILON {
        return colors[upper];
    }
    colors[lower].lerp(colors[upper], (t - stops[lower]) / span)
}
