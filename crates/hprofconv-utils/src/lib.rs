//! # hprofconv Utilities
//!
//! Shared helpers for the hprofconv workspace.
//!
//! Right now this is the logging setup used by the command-line front end,
//! built on `tracing`. The converter library itself only emits events and
//! never installs a subscriber.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
