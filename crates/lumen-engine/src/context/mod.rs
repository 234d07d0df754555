//! Per-GPU-context state.
//!
//! A [`Context`] owns everything the resource layer shares: the backend, the
//! resource cache and its return queue, the proxy registry, the drawing
//! manager and the optional worker pool. There are no globals; tests build
//! isolated contexts over an in-memory backend.

mod config;
mod engine;
mod outcome;

pub use config::EngineConfig;
pub use engine::Context;
pub use outcome::FlushOutcome;
