//! Loader error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported document format for {}: expected a .toml or .json file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The source is not valid structured data.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Two network entries share a name.
    #[error("duplicate network name '{0}'")]
    DuplicateNetworkName(String),

    /// One or more fields violate their constraints.
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// A loaded configuration could not be rendered back to a document.
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
}

impl ConfigError {
    /// Field paths of every validation failure, in report order.
    pub fn field_paths(&self) -> Vec<&str> {
        match self {
            ConfigError::Validation(errors) => errors.iter().map(|e| e.path.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single field violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {violation}")]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `networks.dev.port`.
    pub path: String,
    pub violation: Violation,
}

impl ValidationError {
    pub(crate) fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }
}

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    Empty,
    PortOutOfRange(String),
    InvalidHost(String),
    UnknownField,
    /// The same key appears twice in one table.
    Repeated,
    /// The same section was given under more than one spelling.
    Conflict(String),
    /// `compilers` must name exactly one compiler.
    CompilerCount(usize),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing => f.write_str("missing required field"),
            Violation::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Violation::Empty => f.write_str("must not be empty"),
            Violation::PortOutOfRange(port) => {
                write!(f, "port {port} is outside the range 1-65535")
            }
            Violation::InvalidHost(host) => {
                write!(f, "'{host}' is not a valid hostname or IP address")
            }
            Violation::UnknownField => f.write_str("unknown field (strict mode)"),
            Violation::Repeated => f.write_str("specified more than once"),
            Violation::Conflict(other) => write!(f, "conflicts with '{other}'"),
            Violation::CompilerCount(n) => {
                write!(f, "exactly one compiler must be configured, found {n}")
            }
        }
    }
}
