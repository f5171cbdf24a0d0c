//! Per-network contract registry.

use std::collections::BTreeMap;

use safe_contracts::deployments::{canonical_deployment, Deployment};
use serde::{Deserialize, Serialize};

use crate::{ContractAddress, ContractRole, NetworkId, ProxyError, Result};

/// Addresses of the long-lived contracts on one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Master wallet implementation.
    pub master_wallet: ContractAddress,
    /// Proxy factory.
    pub proxy_factory: ContractAddress,
    /// Default fallback handler.
    pub fallback_handler: ContractAddress,
    /// Batch executor.
    pub batch_executor: ContractAddress,
    /// Spending-limit module, absent on networks that do not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spending_limit_module: Option<ContractAddress>,
}

impl ContractAddresses {
    /// Address bound to `role`, if any.
    pub const fn get(&self, role: ContractRole) -> Option<ContractAddress> {
        match role {
            ContractRole::MasterWallet => Some(self.master_wallet),
            ContractRole::ProxyFactory => Some(self.proxy_factory),
            ContractRole::FallbackHandler => Some(self.fallback_handler),
            ContractRole::BatchExecutor => Some(self.batch_executor),
            ContractRole::SpendingLimitModule => self.spending_limit_module,
        }
    }

    /// Every bound `(role, address)` pair.
    pub fn roles(&self) -> BTreeMap<ContractRole, ContractAddress> {
        ContractRole::ALL.into_iter().filter_map(|role| Some((role, self.get(role)?))).collect()
    }
}

impl From<Deployment> for ContractAddresses {
    fn from(deployment: Deployment) -> Self {
        Self {
            master_wallet: deployment.master_copy.into(),
            proxy_factory: deployment.proxy_factory.into(),
            fallback_handler: deployment.fallback_handler.into(),
            batch_executor: deployment.multi_send.into(),
            spending_limit_module: deployment.allowance_module.map(Into::into),
        }
    }
}

/// Static table mapping networks to their contract addresses.
///
/// The table is owned by the configuration layer and handed to the cache at start-up; this
/// crate only reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryTable(BTreeMap<NetworkId, ContractAddresses>);

impl RegistryTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical v1.3.0 deployments of every named network.
    pub fn canonical() -> Self {
        let entries = NetworkId::NAMED.into_iter().filter_map(|network| {
            canonical_deployment(network.chain_id()).map(|d| (network, ContractAddresses::from(d)))
        });
        Self(entries.collect())
    }

    /// Adds or replaces the entry of `network`.
    pub fn with_network(mut self, network: NetworkId, addresses: ContractAddresses) -> Self {
        self.insert(network, addresses);
        self
    }

    /// Adds or replaces the entry of `network`.
    pub fn insert(&mut self, network: NetworkId, addresses: ContractAddresses) {
        self.0.insert(network, addresses);
    }

    /// Networks present in the table.
    pub fn networks(&self) -> impl Iterator<Item = NetworkId> + '_ {
        self.0.keys().copied()
    }

    /// Role-to-address map of `network`.
    pub fn resolve_registry(&self, network: NetworkId) -> Result<BTreeMap<ContractRole, ContractAddress>> {
        Ok(self.entry(network)?.roles())
    }

    /// Address bound to `role` on `network`.
    pub fn address(&self, network: NetworkId, role: ContractRole) -> Result<ContractAddress> {
        self.entry(network)?
            .get(role)
            .ok_or(ProxyError::UnsupportedNetwork { network, role: Some(role) })
    }

    fn entry(&self, network: NetworkId) -> Result<&ContractAddresses> {
        self.0.get(&network).ok_or(ProxyError::UnsupportedNetwork { network, role: None })
    }
}
