//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (read, pick format)
//!     → document.rs (parse into an order- and duplicate-preserving tree)
//!     → validation.rs (types, ranges, duplicate names, strictness)
//!     → RootConfig (validated, immutable)
//!     → handed to downstream tooling
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there are no setters
//! - Wrong types are errors, never coerced
//! - Unknown keys are preserved unless strict mode is requested
//! - Load is all-or-nothing: no partially populated config is returned

pub mod document;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use document::Format;
pub use error::{ConfigError, ValidationError, Violation};
pub use loader::{load_config, load_config_str, load_config_with, LoadOptions};
pub use schema::{
    CompilerSpec, NetworkId, NetworkProfile, RootConfig, TestRunnerOptions, WILDCARD_NETWORK_ID,
};
