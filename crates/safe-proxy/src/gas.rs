//! Gas estimation with a fixed safety margin.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    ContractAddress, EncodedCall, GasEstimate, NetworkTransport, Operation, ProxyError, Result,
    TransportError,
};

/// Factor applied to the node's raw estimate to absorb estimation error under congestion.
pub const SAFETY_MULTIPLIER: u64 = 2;

/// Asks the network for execution cost estimates. Never retries.
#[derive(Clone, Debug)]
pub struct GasEstimator {
    transport: Arc<dyn NetworkTransport>,
}

impl GasEstimator {
    /// Creates an estimator over `transport`.
    pub fn new(transport: Arc<dyn NetworkTransport>) -> Self {
        Self { transport }
    }

    /// Estimates `call` sent by `from` and applies [`SAFETY_MULTIPLIER`].
    pub async fn estimate(&self, call: &EncodedCall, from: ContractAddress) -> Result<GasEstimate> {
        self.estimate_with_cancel(call, from, &CancellationToken::new()).await
    }

    /// Like [`Self::estimate`], but gives up with [`ProxyError::Cancelled`] once `cancel` fires.
    ///
    /// Only plain calls can be simulated. A delegate call (a batch) runs in the wallet's context
    /// and is rejected with [`ProxyError::InvalidParameters`] without reaching the network.
    pub async fn estimate_with_cancel(
        &self,
        call: &EncodedCall,
        from: ContractAddress,
        cancel: &CancellationToken,
    ) -> Result<GasEstimate> {
        if call.operation() == Operation::DelegateCall {
            return Err(ProxyError::invalid(format!(
                "{} to {} is a delegate call and cannot be estimated as a transaction",
                call.kind(),
                call.target()
            )));
        }

        let estimated = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProxyError::Cancelled),
            result = self.transport.estimate_gas(call, from) => result,
        };

        match estimated {
            Ok(estimated) => {
                let limit = estimated.saturating_mul(SAFETY_MULTIPLIER);
                debug!(
                    target: "safe_proxy::gas",
                    kind = %call.kind(),
                    target_address = %call.target(),
                    estimated,
                    limit,
                    "Estimated gas"
                );
                Ok(GasEstimate { estimated, limit })
            }
            Err(TransportError::Rejected(reason)) => {
                warn!(target: "safe_proxy::gas", kind = %call.kind(), %reason, "Simulation rejected");
                Err(ProxyError::EstimationFailed(reason))
            }
            Err(TransportError::Unavailable(reason)) => {
                warn!(target: "safe_proxy::gas", kind = %call.kind(), %reason, "Estimation unavailable");
                Err(ProxyError::NetworkUnavailable(reason))
            }
        }
    }
}
