//! Configuration schema definitions.
//!
//! These are the validated, immutable types handed to downstream tooling.
//! They are only ever constructed by the loader (see `validation.rs`), so
//! every value reachable from a [`RootConfig`] already satisfies its
//! invariants. All types serialize back to the canonical document shape.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use url::Url;

/// Sentinel accepted in place of a network id to mean "any chain".
pub const WILDCARD_NETWORK_ID: &str = "*";

/// Compiler assumed when the document does not name one.
pub const DEFAULT_COMPILER: &str = "solc";

/// Opaque settings bag passed verbatim to the external test runner.
pub type TestRunnerOptions = Map<String, Value>;

/// Root configuration for the toolchain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootConfig {
    pub(crate) networks: BTreeMap<String, NetworkProfile>,

    #[serde(rename = "testRunnerOptions")]
    pub(crate) test_runner_options: TestRunnerOptions,

    pub(crate) compiler: CompilerSpec,

    /// Unknown top-level keys kept for forward compatibility.
    #[serde(flatten)]
    pub(crate) extensions: Map<String, Value>,
}

impl RootConfig {
    /// All network profiles, keyed by name.
    pub fn networks(&self) -> &BTreeMap<String, NetworkProfile> {
        &self.networks
    }

    /// Look up a network profile by name.
    pub fn network(&self, name: &str) -> Option<&NetworkProfile> {
        self.networks.get(name)
    }

    pub fn test_runner_options(&self) -> &TestRunnerOptions {
        &self.test_runner_options
    }

    pub fn compiler(&self) -> &CompilerSpec {
        &self.compiler
    }

    /// Top-level keys the loader did not recognise (lenient mode only).
    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }
}

/// One deployment target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkProfile {
    /// Map key in the document; not repeated inside the entry.
    #[serde(skip)]
    pub(crate) name: String,

    pub(crate) host: String,

    pub(crate) port: u16,

    #[serde(rename = "networkId")]
    pub(crate) network_id: NetworkId,

    /// Additional per-network keys (e.g. `gas`, `from`) passed through untouched.
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl NetworkProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn socket_address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]:{}", self.host, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// JSON-RPC endpoint for this profile (`http://host:port/`).
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}", self.socket_address()))
    }
}

/// Chain selector for a network profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkId {
    /// Accept whatever chain the node reports.
    Wildcard,
    /// A literal identifier, kept exactly as written.
    Id(String),
}

impl NetworkId {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, NetworkId::Wildcard)
    }

    /// Whether a node reporting `chain_id` is acceptable for this profile.
    ///
    /// Literal ids are compared numerically; both decimal and `0x`-prefixed
    /// hex literals are understood. Non-numeric literals never match.
    pub fn matches(&self, chain_id: u64) -> bool {
        match self {
            NetworkId::Wildcard => true,
            NetworkId::Id(literal) => parse_chain_id(literal) == Some(chain_id),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NetworkId::Wildcard => WILDCARD_NETWORK_ID,
            NetworkId::Id(literal) => literal,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn parse_chain_id(literal: &str) -> Option<u64> {
    let literal = literal.trim();
    match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => literal.parse().ok(),
    }
}

/// Pinned contract compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilerSpec {
    pub(crate) name: String,

    pub(crate) version: String,

    /// Compiler-specific settings, passed through untouched.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub(crate) settings: Map<String, Value>,

    /// Other compiler keys (e.g. `docker`), passed through untouched.
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl CompilerSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
