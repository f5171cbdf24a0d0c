//! Seam to the ledger network.

use core::fmt::Debug;

use alloy_primitives::Bytes;

use crate::{ContractAddress, EncodedCall, NetworkId, TransportError};

/// Network collaborator used by the cache, the gas estimator and the direct master-copy read.
///
/// Implementations own their timeouts: a request that outlives the deadline is reported as
/// [`TransportError::Unavailable`].
#[async_trait::async_trait]
pub trait NetworkTransport: Debug + Send + Sync {
    /// Executes a read-only call against `target` and returns the raw return data.
    async fn call(
        &self,
        target: ContractAddress,
        data: Bytes,
        from: Option<ContractAddress>,
    ) -> Result<Bytes, TransportError>;

    /// Asks the node for the gas `call` would consume when sent by `from`.
    async fn estimate_gas(
        &self,
        call: &EncodedCall,
        from: ContractAddress,
    ) -> Result<u64, TransportError>;

    /// Network the transport is currently connected to.
    async fn network_id(&self) -> Result<NetworkId, TransportError>;
}
