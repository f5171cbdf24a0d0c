//! JSON-RPC implementation of the network transport.

use std::{future::Future, time::Duration};

use alloy_primitives::Bytes;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_transport::{RpcError, TransportErrorKind};
use reqwest::Url;
use safe_proxy::{ContractAddress, EncodedCall, NetworkId, NetworkTransport, TransportError};
use tracing::trace;

/// Default deadline of a single RPC request.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// [`NetworkTransport`] over an HTTP JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcTransport {
    provider: RootProvider,
    url: Url,
    timeout: Duration,
}

impl RpcTransport {
    /// Connects to `url`. Requests outliving `timeout` are reported as unavailable.
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self { provider: RootProvider::new_http(url.clone()), url, timeout }
    }

    /// Endpoint URL.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn with_deadline<T>(
        &self,
        method: &'static str,
        request: impl Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    ) -> Result<T, TransportError> {
        trace!(target: "safe_deployer::rpc", method, url = %self.url, "Sending request");
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(into_transport_error),
            Err(_) => Err(TransportError::Unavailable(format!(
                "{method} timed out after {}s",
                self.timeout.as_secs_f64()
            ))),
        }
    }
}

/// Error responses from the node are rejections (e.g. reverts); everything else is an
/// availability problem.
fn into_transport_error(err: RpcError<TransportErrorKind>) -> TransportError {
    match err {
        RpcError::ErrorResp(payload) => TransportError::Rejected(payload.message.to_string()),
        other => TransportError::Unavailable(other.to_string()),
    }
}

fn request(target: ContractAddress, data: Bytes, from: Option<ContractAddress>) -> TransactionRequest {
    let tx = TransactionRequest::default()
        .to(target.as_address())
        .input(TransactionInput::new(data));
    match from {
        Some(from) => tx.from(from.as_address()),
        None => tx,
    }
}

#[async_trait::async_trait]
impl NetworkTransport for RpcTransport {
    async fn call(
        &self,
        target: ContractAddress,
        data: Bytes,
        from: Option<ContractAddress>,
    ) -> Result<Bytes, TransportError> {
        let tx = request(target, data, from);
        self.with_deadline("eth_call", async { self.provider.call(tx).await }).await
    }

    async fn estimate_gas(
        &self,
        call: &EncodedCall,
        from: ContractAddress,
    ) -> Result<u64, TransportError> {
        let tx = request(call.target(), call.data().clone(), Some(from)).value(call.value());
        self.with_deadline("eth_estimateGas", async { self.provider.estimate_gas(tx).await }).await
    }

    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        let chain_id =
            self.with_deadline("eth_chainId", async { self.provider.get_chain_id().await }).await?;
        Ok(NetworkId::from_chain_id(chain_id))
    }
}
