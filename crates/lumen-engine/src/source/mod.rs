//! CPU-side content producers consumed by resource tasks.
//!
//! A [`DataSource`] is pulled exactly once by the task that owns it. Sources
//! can be wrapped with [`async_source`] so that production starts right away
//! on a [`WorkerPool`] thread while the GPU thread keeps recording.

mod data_source;
mod image;
mod shape;
mod vertex;
mod worker;

pub use data_source::{AsyncSource, DataSource, FnSource, ValueSource, async_source};
pub use image::{ImageBuffer, ImageGenerator, ImageInfo};
pub use shape::{Shape, ShapeBuffer};
pub use vertex::VertexProvider;
pub use worker::{JobHandle, WorkerPool};
