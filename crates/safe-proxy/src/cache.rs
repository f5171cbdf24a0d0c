//! Instance cache: at most one live handle per contract role on the active network.
//!
//! The cache lock only guards the synchronous "cached, in flight, or cold" decision. A cold
//! lookup spawns one resolution task per `(role, generation)` and every concurrent caller awaits
//! the same shared completion, so N callers cost one network round trip. Cancelling a caller
//! only drops its interest in the shared completion; the task still settles the slot.
//!
//! Every update under the lock is a single map or field write, so a poisoned lock still holds a
//! consistent epoch and is recovered rather than propagated.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, PoisonError},
};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    ContractAddress, ContractHandle, ContractRole, NetworkId, NetworkTransport, ProxyError,
    RegistryTable, Result,
};

type Resolution = Shared<BoxFuture<'static, Result<Arc<ContractHandle>>>>;

enum Slot {
    Ready(Arc<ContractHandle>),
    Resolving(Resolution),
}

/// Everything bound to the active network. Replaced wholesale on a switch.
struct Epoch {
    network: NetworkId,
    generation: u64,
    slots: HashMap<ContractRole, Slot>,
}

/// Owner of the contract handles of the active network.
///
/// Cloning is cheap and yields a view of the same cache.
#[derive(Clone, derive_more::Debug)]
pub struct InstanceCache {
    #[debug(ignore)]
    transport: Arc<dyn NetworkTransport>,
    registry: Arc<RegistryTable>,
    #[debug(ignore)]
    epoch: Arc<Mutex<Epoch>>,
}

impl InstanceCache {
    /// Creates an empty cache bound to `network`.
    pub fn new(
        transport: Arc<dyn NetworkTransport>,
        registry: RegistryTable,
        network: NetworkId,
    ) -> Self {
        let epoch = Epoch { network, generation: 0, slots: HashMap::new() };
        Self { transport, registry: Arc::new(registry), epoch: Arc::new(Mutex::new(epoch)) }
    }

    /// The network transport handles are bound to.
    pub fn transport(&self) -> &Arc<dyn NetworkTransport> {
        &self.transport
    }

    /// The registry table the cache resolves addresses from.
    pub fn registry(&self) -> &RegistryTable {
        &self.registry
    }

    /// Role-to-address map of `network`. No network access.
    pub fn resolve_registry(
        &self,
        network: NetworkId,
    ) -> Result<BTreeMap<ContractRole, ContractAddress>> {
        self.registry.resolve_registry(network)
    }

    /// Currently active network.
    pub fn active_network(&self) -> NetworkId {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner).network
    }

    /// Returns the cached handle of `role` without resolving it.
    pub fn cached(&self, role: ContractRole) -> Option<Arc<ContractHandle>> {
        match self.epoch.lock().unwrap_or_else(PoisonError::into_inner).slots.get(&role) {
            Some(Slot::Ready(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Returns the handle of `role` on `network`, resolving it on first use.
    pub async fn get_handle(
        &self,
        role: ContractRole,
        network: NetworkId,
    ) -> Result<Arc<ContractHandle>> {
        self.get_handle_with_cancel(role, network, &CancellationToken::new()).await
    }

    /// Like [`Self::get_handle`], but gives up with [`ProxyError::Cancelled`] once `cancel` fires.
    pub async fn get_handle_with_cancel(
        &self,
        role: ContractRole,
        network: NetworkId,
        cancel: &CancellationToken,
    ) -> Result<Arc<ContractHandle>> {
        let resolution = {
            let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
            if epoch.network != network {
                return Err(ProxyError::InactiveNetwork { requested: network, active: epoch.network });
            }
            match epoch.slots.get(&role) {
                Some(Slot::Ready(handle)) => {
                    debug!(target: "safe_proxy::cache", %role, %network, "Handle cache hit");
                    return Ok(handle.clone());
                }
                Some(Slot::Resolving(resolution)) => {
                    debug!(target: "safe_proxy::cache", %role, %network, "Joining in-flight resolution");
                    resolution.clone()
                }
                None => {
                    let address = self.registry.address(network, role)?;
                    let resolution = self.spawn_resolution(role, address, network, epoch.generation);
                    epoch.slots.insert(role, Slot::Resolving(resolution.clone()));
                    resolution
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProxyError::Cancelled),
            result = resolution => result,
        }
    }

    /// Makes `network` the active network, discarding every handle of the previous one.
    ///
    /// Resolutions still in flight for the previous network complete, but their results are
    /// neither cached nor handed out. Returns `false` if `network` was already active.
    pub fn switch_network(&self, network: NetworkId) -> bool {
        let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if epoch.network == network {
            return false;
        }
        info!(
            target: "safe_proxy::cache",
            from = %epoch.network,
            to = %network,
            discarded = epoch.slots.len(),
            "Switching network"
        );
        epoch.network = network;
        epoch.generation += 1;
        epoch.slots.clear();
        true
    }

    /// Asks the transport which network it is connected to and switches to it if needed.
    pub async fn detect_network(&self) -> Result<NetworkId> {
        let network = self.transport.network_id().await.map_err(|err| {
            warn!(target: "safe_proxy::cache", %err, "Failed to query network id");
            ProxyError::NetworkUnavailable(err.to_string())
        })?;
        self.switch_network(network);
        Ok(network)
    }

    fn spawn_resolution(
        &self,
        role: ContractRole,
        address: ContractAddress,
        network: NetworkId,
        generation: u64,
    ) -> Resolution {
        let transport = self.transport.clone();
        let epoch = self.epoch.clone();

        let task = tokio::spawn(async move {
            let result = resolve(transport, role, address, network, generation).await;

            let mut epoch = epoch.lock().unwrap_or_else(PoisonError::into_inner);
            if epoch.generation != generation {
                debug!(target: "safe_proxy::cache", %role, %network, "Discarding stale resolution");
                return Err(ProxyError::InactiveNetwork { requested: network, active: epoch.network });
            }
            match &result {
                Ok(handle) => {
                    epoch.slots.insert(role, Slot::Ready(handle.clone()));
                }
                Err(_) => {
                    epoch.slots.remove(&role);
                }
            }
            result
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(ProxyError::NetworkUnavailable(format!("resolution task failed: {err}")))
            })
        }
        .boxed()
        .shared()
    }
}

/// Confirms the transport is on `network` and binds the handle.
async fn resolve(
    transport: Arc<dyn NetworkTransport>,
    role: ContractRole,
    address: ContractAddress,
    network: NetworkId,
    generation: u64,
) -> Result<Arc<ContractHandle>> {
    let actual = transport.network_id().await.map_err(|err| {
        warn!(target: "safe_proxy::cache", %role, %network, %err, "Handle resolution failed");
        ProxyError::NetworkUnavailable(err.to_string())
    })?;
    if actual != network {
        warn!(target: "safe_proxy::cache", %role, expected = %network, %actual, "Transport network mismatch");
        return Err(ProxyError::NetworkMismatch { expected: network, actual });
    }

    info!(target: "safe_proxy::cache", %role, %network, %address, generation, "Resolved contract handle");
    Ok(Arc::new(ContractHandle::new(role, address, network, generation, transport)))
}
