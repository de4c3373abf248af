//! Chain-specific types and error definitions.

use thiserror::Error;
use url::Url;

use crate::config::schema::NetworkId;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while probing a configured network.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The profile does not yield a usable endpoint URL.
    #[error("Invalid endpoint for network '{network}': {reason}")]
    Endpoint { network: String, reason: String },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node is on a chain the profile does not accept.
    #[error("Chain ID mismatch: network expects {expected}, node reports {actual}")]
    ChainMismatch { expected: NetworkId, actual: u64 },
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// What a reachable node reported for one network profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub network: String,
    pub endpoint: Url,
    pub expected: NetworkId,
    pub chain_id: ChainId,
    pub block_number: u64,
}

impl ProbeReport {
    /// Whether the reported chain satisfies the profile's network id.
    pub fn accepted(&self) -> bool {
        self.expected.matches(self.chain_id.0)
    }

    /// Turn a rejected chain into a [`ProbeError::ChainMismatch`].
    pub fn ensure_accepted(&self) -> ProbeResult<()> {
        if self.accepted() {
            Ok(())
        } else {
            Err(ProbeError::ChainMismatch {
                expected: self.expected.clone(),
                actual: self.chain_id.0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(expected: NetworkId, chain_id: u64) -> ProbeReport {
        ProbeReport {
            network: "development".into(),
            endpoint: Url::parse("http://127.0.0.1:8545").unwrap(),
            expected,
            chain_id: ChainId(chain_id),
            block_number: 0,
        }
    }

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1337u64);
        assert_eq!(chain_id.0, 1337);
        assert_eq!(u64::from(chain_id), 1337);
    }

    #[test]
    fn test_wildcard_report_accepted() {
        assert!(report(NetworkId::Wildcard, 31337).ensure_accepted().is_ok());
    }

    #[test]
    fn test_mismatched_report_rejected() {
        let err = report(NetworkId::Id("5777".into()), 1337)
            .ensure_accepted()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Chain ID mismatch: network expects 5777, node reports 1337"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");
    }
}
