//! Content-derived cache keys.
//!
//! A [`ContentKey`] canonicalizes the typed inputs that determine a cached
//! artifact into a flat sequence of 32-bit words. Keys are process-local:
//! the encoding is not stable across versions and is never persisted.

mod content_key;
mod domain;

pub use content_key::ContentKey;
pub use domain::KeyDomain;
