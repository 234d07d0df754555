//! Small geometry and color types shared by shape keys, clip handling and
//! gradient generation.
//!
//! Canonical space matches the draw-recording layer: device pixels, origin
//! top-left, +Y down.

mod color;
mod rect;

pub use color::Color;
pub use rect::Rect;
