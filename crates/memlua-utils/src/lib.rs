//! # memlua Utilities
//!
//! Shared logging and configuration helpers for memlua.
//!
//! This crate provides the `tracing` setup used by the `memlua` binary and by
//! hosts embedding the bridge.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with_config, init_logging_with_level, LogFormat, LogLevel, LoggingConfig,
    LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
