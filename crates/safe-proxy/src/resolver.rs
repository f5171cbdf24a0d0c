//! Master-copy resolution for existing proxies.

use core::fmt::Debug;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use alloy_sol_types::SolCall;
use safe_contracts::interfaces::IGnosisSafeProxy;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{ContractAddress, IndexerError, InstanceCache, NetworkId, ProxyError, Result, TransportError};

/// Indexing service that tracks which implementation backs each proxy.
#[async_trait::async_trait]
pub trait Indexer: Debug + Send + Sync {
    /// Implementation address recorded for `proxy` on `network`, `None` when the indexer has no
    /// record of it.
    async fn implementation_address(
        &self,
        network: NetworkId,
        proxy: ContractAddress,
    ) -> Result<Option<ContractAddress>, IndexerError>;
}

/// Outcome of a resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// The proxy delegates to this implementation.
    Resolved(ContractAddress),
    /// No record: the address is not a proxy, or is not indexed yet.
    NotFound,
    /// The source failed; retrying may succeed.
    TransientError(String),
}

/// Where an answer came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A previous resolution held by the resolver.
    Cache,
    /// The indexing service.
    Indexer,
    /// A `masterCopy()` read against the proxy itself.
    DirectQuery,
}

/// Answer to "which master copy backs this proxy".
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MasterCopyResolution {
    /// Queried proxy.
    pub proxy: ContractAddress,
    /// Outcome.
    #[serde(flatten)]
    pub status: ResolutionStatus,
    /// Source of the outcome.
    pub source: ResolutionSource,
}

impl MasterCopyResolution {
    /// The resolved implementation, if any.
    pub const fn implementation(&self) -> Option<ContractAddress> {
        match self.status {
            ResolutionStatus::Resolved(address) => Some(address),
            _ => None,
        }
    }

    /// The transient failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ResolutionStatus::TransientError(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Resolves the master copy behind proxies of the active network.
///
/// The indexer is the only source consulted by [`Self::resolve_master_copy`]. A direct ledger
/// read is more expensive and is only performed when the caller asks for it.
#[derive(Clone, derive_more::Debug)]
pub struct MasterCopyResolver {
    cache: InstanceCache,
    indexer: Arc<dyn Indexer>,
    #[debug(ignore)]
    resolved: Arc<Mutex<HashMap<(NetworkId, ContractAddress), ContractAddress>>>,
}

impl MasterCopyResolver {
    /// Creates a resolver reading the active network from `cache`.
    pub fn new(cache: InstanceCache, indexer: Arc<dyn Indexer>) -> Self {
        Self { cache, indexer, resolved: Arc::default() }
    }

    /// Asks the indexer for the master copy of `proxy`.
    pub async fn resolve_master_copy(&self, proxy: ContractAddress) -> Result<MasterCopyResolution> {
        self.resolve_master_copy_with_cancel(proxy, &CancellationToken::new()).await
    }

    /// Like [`Self::resolve_master_copy`], but gives up with [`ProxyError::Cancelled`] once
    /// `cancel` fires.
    pub async fn resolve_master_copy_with_cancel(
        &self,
        proxy: ContractAddress,
        cancel: &CancellationToken,
    ) -> Result<MasterCopyResolution> {
        let network = self.cache.active_network();
        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProxyError::Cancelled),
            answer = self.indexer.implementation_address(network, proxy) => answer,
        };

        let status = match answer {
            Ok(Some(implementation)) => ResolutionStatus::Resolved(implementation),
            Ok(None) => ResolutionStatus::NotFound,
            Err(err) => {
                warn!(target: "safe_proxy::resolver", %proxy, %network, %err, "Indexer lookup failed");
                ResolutionStatus::TransientError(err.to_string())
            }
        };
        Ok(self.finish(network, proxy, status, ResolutionSource::Indexer))
    }

    /// Reads `masterCopy()` from the proxy through the network transport.
    ///
    /// A revert, an empty answer or the zero address means the account is not a proxy and is
    /// reported as [`ResolutionStatus::NotFound`].
    pub async fn resolve_master_copy_direct(
        &self,
        proxy: ContractAddress,
    ) -> Result<MasterCopyResolution> {
        let network = self.cache.active_network();
        let data = IGnosisSafeProxy::masterCopyCall {}.abi_encode();

        let status = match self.cache.transport().call(proxy, data.into(), None).await {
            Ok(output) => match IGnosisSafeProxy::masterCopyCall::abi_decode_returns(&output, true) {
                Ok(decoded) if !decoded.implementation.is_zero() => {
                    ResolutionStatus::Resolved(decoded.implementation.into())
                }
                _ => ResolutionStatus::NotFound,
            },
            Err(TransportError::Rejected(reason)) => {
                debug!(target: "safe_proxy::resolver", %proxy, %reason, "masterCopy() reverted");
                ResolutionStatus::NotFound
            }
            Err(TransportError::Unavailable(reason)) => {
                warn!(target: "safe_proxy::resolver", %proxy, %network, %reason, "Direct read failed");
                ResolutionStatus::TransientError(reason)
            }
        };
        Ok(self.finish(network, proxy, status, ResolutionSource::DirectQuery))
    }

    /// Last successful answer for `proxy` on the active network, without any I/O.
    pub fn cached_master_copy(&self, proxy: ContractAddress) -> Option<MasterCopyResolution> {
        let network = self.cache.active_network();
        let resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        resolved.get(&(network, proxy)).map(|implementation| MasterCopyResolution {
            proxy,
            status: ResolutionStatus::Resolved(*implementation),
            source: ResolutionSource::Cache,
        })
    }

    fn finish(
        &self,
        network: NetworkId,
        proxy: ContractAddress,
        status: ResolutionStatus,
        source: ResolutionSource,
    ) -> MasterCopyResolution {
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        match &status {
            &ResolutionStatus::Resolved(implementation) => {
                info!(target: "safe_proxy::resolver", %proxy, %implementation, ?source, "Resolved master copy");
                // Answers recorded on other networks are stale after a switch.
                resolved.retain(|(entry_network, _), _| *entry_network == network);
                resolved.insert((network, proxy), implementation);
            }
            ResolutionStatus::NotFound => {
                if resolved.remove(&(network, proxy)).is_some() {
                    debug!(target: "safe_proxy::resolver", %proxy, %network, "Dropped stale master copy");
                }
            }
            ResolutionStatus::TransientError(_) => {}
        }
        drop(resolved);
        MasterCopyResolution { proxy, status, source }
    }
}
