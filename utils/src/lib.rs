//! Shared utilities for stakesync.

pub mod logging;

pub use logging::{init_tracing, LogFormat, LogFormatError};
