//! Deferred destruction of GPU objects.
//!
//! Native GPU handles may only be released on the thread that owns the GPU
//! context, but application code can drop the last reference to a resource
//! from any thread. [`Shared`] handles therefore do not free their node on
//! last drop: they push it onto the [`ReturnQueue`] that created them, and
//! the owning thread drains that queue once per flush.
//!
//! If the queue itself is destroyed first (device loss, shutdown with a lost
//! context), the remaining nodes are deleted without their native release
//! hook.

mod queue;
mod shared;

pub use queue::{ReturnNode, ReturnQueue};
pub use shared::{Shared, WeakShared};
