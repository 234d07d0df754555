//! Logger setup.
//!
//! The engine itself only uses the `log` facade. Applications and tests that
//! want output call [`init_logging`] once; the engine never installs a
//! logger on its own.

mod init;

pub use init::{LoggingConfig, init_logging};
