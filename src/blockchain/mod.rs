//! Blockchain connectivity checks for configured networks.
//!
//! # Data Flow
//! ```text
//! RootConfig (validated)
//!     → NetworkProfile::endpoint() (http://host:port)
//!     → client.rs (JSON-RPC with timeouts)
//!     → ProbeReport (chain id, block, accepted?)
//! ```
//!
//! Loading never touches the network; probing is an explicit, separate step.

pub mod client;
pub mod types;

pub use client::{probe_network, NetworkClient};
pub use types::{ChainId, ProbeError, ProbeReport, ProbeResult};
