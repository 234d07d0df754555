use crate::drawing::FlushReport;

/// What the caller should do after [`Context::flush`](super::Context::flush).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FlushOutcome {
    /// Work was submitted; the report says how it went.
    Submitted(FlushReport),
    /// Nothing was queued.
    Idle,
    /// The device is gone. Every cache and queued task was dropped; recreate
    /// content from scratch next frame.
    DeviceLost,
}
