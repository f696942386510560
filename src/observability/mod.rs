//! Observability module for the conformance suite.
//!
//! Everything in the crate logs through `tracing`; this module installs a
//! subscriber for binaries and test runs that want to see it.

mod logging;

pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
