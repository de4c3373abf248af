//! Observability subsystem.
//!
//! The loader and the network probe emit `tracing` events; this module only
//! installs the subscriber that renders them.

pub mod logging;

pub use logging::{init_logging, LogFormat};
