//! Client-gateway implementation of the indexer.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use safe_proxy::{ContractAddress, Indexer, IndexerError, NetworkId};
use serde::Deserialize;
use tracing::debug;

/// Default deadline of a gateway request.
pub const DEFAULT_INDEXER_TIMEOUT: Duration = Duration::from_secs(10);

/// Subset of the gateway's safe info record this tool reads.
#[derive(Debug, Deserialize)]
struct SafeInfo {
    implementation: AddressInfo,
}

#[derive(Debug, Deserialize)]
struct AddressInfo {
    value: String,
}

/// [`Indexer`] backed by the client gateway's `GET /chains/{chain}/safes/{address}/`.
#[derive(Debug, Clone)]
pub struct GatewayIndexer {
    client: Client,
    base_url: Url,
}

impl GatewayIndexer {
    /// Creates a client for the gateway at `base_url` (including its version prefix).
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, IndexerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| IndexerError::Transient(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, base_url })
    }

    fn safe_info_url(&self, network: NetworkId, proxy: ContractAddress) -> String {
        format!(
            "{}/chains/{}/safes/{}/",
            self.base_url.as_str().trim_end_matches('/'),
            network.chain_id(),
            proxy.to_checksum()
        )
    }
}

#[async_trait::async_trait]
impl Indexer for GatewayIndexer {
    async fn implementation_address(
        &self,
        network: NetworkId,
        proxy: ContractAddress,
    ) -> Result<Option<ContractAddress>, IndexerError> {
        let url = self.safe_info_url(network, proxy);
        debug!(target: "safe_deployer::indexer", %url, "Fetching safe info");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| IndexerError::Transient(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(IndexerError::Transient(format!("gateway answered {status}")));
            }
            _ => {}
        }

        let info: SafeInfo = response.json().await.map_err(|err| {
            if err.is_decode() {
                IndexerError::Malformed(err.to_string())
            } else {
                IndexerError::Transient(err.to_string())
            }
        })?;
        let implementation = info
            .implementation
            .value
            .parse()
            .map_err(|err: safe_proxy::ParseAddressError| IndexerError::Malformed(err.to_string()))?;
        Ok(Some(implementation))
    }
}

/// Stand-in used when a network has no gateway configured. Every lookup fails as transient.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredIndexer;

#[async_trait::async_trait]
impl Indexer for UnconfiguredIndexer {
    async fn implementation_address(
        &self,
        network: NetworkId,
        _proxy: ContractAddress,
    ) -> Result<Option<ContractAddress>, IndexerError> {
        Err(IndexerError::Transient(format!("no indexer configured for network {network}")))
    }
}
