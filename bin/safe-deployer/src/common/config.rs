//! Network configuration: endpoints and contract addresses per network.
//!
//! A JSON file may override any network; networks it does not mention keep the built-in
//! defaults.
//!
//! ```json
//! {
//!   "networks": {
//!     "ftmtestnet": {
//!       "rpc_url": "http://localhost:8545",
//!       "indexer_url": "http://localhost:9005/v1",
//!       "contracts": { "master_wallet": "0x…", "proxy_factory": "0x…", … }
//!     }
//!   }
//! }
//! ```

use std::{collections::BTreeMap, path::Path};

use reqwest::Url;
use safe_proxy::{ContractAddresses, NetworkId, RegistryTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeployerError, Result};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "SAFE_DEPLOYER_CONFIG";

/// Settings of one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Client gateway base URL, including its version prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_url: Option<String>,
    /// Contract addresses, replacing the canonical ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts: Option<ContractAddresses>,
}

/// Full configuration of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployerConfig {
    /// Per-network settings.
    #[serde(default)]
    pub networks: BTreeMap<NetworkId, NetworkConfig>,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        let networks = [
            (
                NetworkId::Fantom,
                NetworkConfig {
                    rpc_url: Some("https://rpcapi-tracing.fantom.network".to_string()),
                    indexer_url: Some("https://safe.fantom.network/v1".to_string()),
                    contracts: None,
                },
            ),
            (
                NetworkId::FantomTestnet,
                NetworkConfig {
                    rpc_url: Some("https://rpcapi-tracing.testnet.fantom.network".to_string()),
                    indexer_url: Some("https://safe.testnet.fantom.network/v1".to_string()),
                    contracts: None,
                },
            ),
        ];
        Self { networks: networks.into_iter().collect() }
    }
}

impl DeployerConfig {
    /// Loads the built-in defaults, overlaid with the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else { return Ok(Self::default()) };
        debug!(target: "safe_deployer::config", path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)?;
        Self::default().merge_json(&content)
    }

    /// Overlays the networks of a JSON document on top of `self`.
    pub fn merge_json(mut self, json: &str) -> Result<Self> {
        let overlay: Self = serde_json::from_str(json)?;
        for (network, settings) in overlay.networks {
            let entry = self.networks.entry(network).or_default();
            if settings.rpc_url.is_some() {
                entry.rpc_url = settings.rpc_url;
            }
            if settings.indexer_url.is_some() {
                entry.indexer_url = settings.indexer_url;
            }
            if settings.contracts.is_some() {
                entry.contracts = settings.contracts;
            }
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks that every URL parses.
    pub fn validate(&self) -> Result<()> {
        for (network, settings) in &self.networks {
            for url in [&settings.rpc_url, &settings.indexer_url].into_iter().flatten() {
                parse_url(url).map_err(|err| {
                    DeployerError::Config(format!("network {network}: {err}"))
                })?;
            }
        }
        Ok(())
    }

    /// Canonical registry with the configured contract overrides applied.
    pub fn registry(&self) -> RegistryTable {
        self.networks
            .iter()
            .filter_map(|(network, settings)| Some((*network, settings.contracts?)))
            .fold(RegistryTable::canonical(), |table, (network, contracts)| {
                table.with_network(network, contracts)
            })
    }

    /// JSON-RPC endpoint of `network`, preferring `flag` when given.
    pub fn rpc_url(&self, network: NetworkId, flag: Option<&str>) -> Result<Url> {
        self.endpoint(network, flag, "rpc", |settings| settings.rpc_url.as_deref())
    }

    /// Indexer endpoint of `network`, preferring `flag` when given.
    pub fn indexer_url(&self, network: NetworkId, flag: Option<&str>) -> Result<Url> {
        self.endpoint(network, flag, "indexer", |settings| settings.indexer_url.as_deref())
    }

    fn endpoint(
        &self,
        network: NetworkId,
        flag: Option<&str>,
        kind: &'static str,
        pick: impl Fn(&NetworkConfig) -> Option<&str>,
    ) -> Result<Url> {
        let url = flag
            .or_else(|| self.networks.get(&network).and_then(pick))
            .ok_or(DeployerError::MissingEndpoint { network, kind })?;
        parse_url(url).map_err(DeployerError::InvalidInput)
    }
}

fn parse_url(url: &str) -> std::result::Result<Url, String> {
    let parsed = Url::parse(url).map_err(|err| format!("invalid URL '{url}': {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(format!("unsupported URL scheme '{scheme}' in '{url}'")),
    }
}
