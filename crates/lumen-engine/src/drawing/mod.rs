//! Task ordering for one GPU context.
//!
//! Resource tasks and render tasks are queued in submission order. A flush
//! prepares every resource task, executes them in order, then runs the render
//! tasks in order, so every render pass sees the resources it depends on.

mod manager;
mod render_task;

pub use manager::{DrawingManager, DrawingState, FlushReport};
pub use render_task::{OpsRenderTask, RenderTask};
