//! JSON-RPC probe for configured networks.
//!
//! # Responsibilities
//! - Dial a network profile's `http://host:port` endpoint
//! - Query chain id and latest block with a timeout
//! - Compare the reported chain against the profile's network id

use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::blockchain::types::{ChainId, ProbeError, ProbeReport, ProbeResult};
use crate::config::schema::NetworkProfile;

/// RPC client bound to a single network profile.
#[derive(Clone)]
pub struct NetworkClient {
    provider: Arc<dyn Provider + Send + Sync>,
    profile: NetworkProfile,
    endpoint: url::Url,
    timeout_duration: Duration,
}

impl NetworkClient {
    /// Build a client for `profile`. No request is sent until a query runs.
    pub fn new(profile: &NetworkProfile, timeout_duration: Duration) -> ProbeResult<Self> {
        let endpoint = profile.endpoint().map_err(|e| ProbeError::Endpoint {
            network: profile.name().to_string(),
            reason: e.to_string(),
        })?;
        let provider = ProviderBuilder::new().connect_http(endpoint.clone());

        Ok(Self {
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            profile: profile.clone(),
            endpoint,
            timeout_duration,
        })
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ProbeResult<ChainId> {
        match timeout(self.timeout_duration, self.provider.get_chain_id()).await {
            Ok(Ok(id)) => Ok(ChainId(id)),
            Ok(Err(e)) => Err(ProbeError::Rpc(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ProbeResult<u64> {
        match timeout(self.timeout_duration, self.provider.get_block_number()).await {
            Ok(Ok(number)) => Ok(number),
            Ok(Err(e)) => Err(ProbeError::Rpc(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Query the node and report what it is.
    ///
    /// A reachable node on the wrong chain still yields `Ok`; call
    /// [`ProbeReport::ensure_accepted`] to treat that as an error.
    pub async fn probe(&self) -> ProbeResult<ProbeReport> {
        let chain_id = self.get_chain_id().await?;
        let block_number = self.get_block_number().await?;

        let report = ProbeReport {
            network: self.profile.name().to_string(),
            endpoint: self.endpoint.clone(),
            expected: self.profile.network_id().clone(),
            chain_id,
            block_number,
        };

        if report.accepted() {
            tracing::info!(
                network = %report.network,
                endpoint = %report.endpoint,
                chain_id = chain_id.0,
                block_number,
                "Network reachable"
            );
        } else {
            tracing::warn!(
                network = %report.network,
                expected = %report.expected,
                chain_id = chain_id.0,
                "Node reports a chain the network profile does not accept"
            );
        }

        Ok(report)
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("network", &self.profile.name())
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Probe a single network profile.
pub async fn probe_network(
    profile: &NetworkProfile,
    timeout_duration: Duration,
) -> ProbeResult<ProbeReport> {
    NetworkClient::new(profile, timeout_duration)?.probe().await
}
