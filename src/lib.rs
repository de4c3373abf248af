//! Configuration loader for a smart-contract development toolchain.
//!
//! Reads a TOML or JSON document describing network profiles, test-runner
//! options and the pinned compiler, and returns a validated, immutable
//! [`RootConfig`].

pub mod blockchain;
pub mod config;
pub mod observability;

pub use config::{load_config, load_config_str, load_config_with, ConfigError, LoadOptions};
pub use config::schema::RootConfig;
