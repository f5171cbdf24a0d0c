//! Tests for gas estimation of deployment calls.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, U256};
use safe_proxy::{
    test_utils::MockTransport, AllowanceParameters, ContractAddress, DeploymentBuilder,
    DeploymentSalt, ErrorKind, GasEstimator, InstanceCache, NetworkId, Operation, ProxyError,
    RegistryTable, SetupParameters, TransportError, SAFETY_MULTIPLIER,
};
use tokio_util::sync::CancellationToken;

fn sender() -> ContractAddress {
    ContractAddress::new(Address::repeat_byte(0xee))
}

async fn deployment_call(transport: Arc<MockTransport>) -> safe_proxy::EncodedCall {
    let cache = InstanceCache::new(transport, RegistryTable::canonical(), NetworkId::Fantom);
    let params = SetupParameters::new(
        vec![ContractAddress::new(Address::repeat_byte(0x11))],
        1,
        ContractAddress::ZERO,
    );
    DeploymentBuilder::new(cache)
        .build_deployment(&params, DeploymentSalt::from(42u64))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_estimate_applies_safety_multiplier() {
    let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
    transport.set_gas_estimate(Ok(287_342));
    let call = deployment_call(transport.clone()).await;

    let estimate = GasEstimator::new(transport.clone()).estimate(&call, sender()).await.unwrap();
    assert_eq!(estimate.estimated, 287_342);
    assert_eq!(estimate.limit, 287_342 * SAFETY_MULTIPLIER);
    assert_eq!(transport.estimate_calls(), 1);
}

/// A simulation that reverts surfaces the node's reason verbatim.
#[tokio::test]
async fn test_reverting_simulation_carries_raw_reason() {
    let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
    let reason = "execution reverted: GS013";
    transport.set_gas_estimate(Err(TransportError::Rejected(reason.to_string())));
    let call = deployment_call(transport.clone()).await;

    let err = GasEstimator::new(transport.clone()).estimate(&call, sender()).await.unwrap_err();
    assert_eq!(err, ProxyError::EstimationFailed(reason.to_string()));
    assert_eq!(err.kind(), ErrorKind::EstimationFailed);
    assert!(!err.is_retryable());
    // No internal retry.
    assert_eq!(transport.estimate_calls(), 1);
}

/// A batch runs as a delegate call from the wallet, so it is never sent for estimation as a
/// plain transaction to the batch executor.
#[tokio::test]
async fn test_batch_is_not_estimated_as_plain_call() {
    let transport = Arc::new(MockTransport::new(NetworkId::Mainnet));
    let cache = InstanceCache::new(transport.clone(), RegistryTable::canonical(), NetworkId::Mainnet);
    let wallet = ContractAddress::new(Address::repeat_byte(0x99));
    let allowance = AllowanceParameters::new(
        ContractAddress::new(Address::repeat_byte(0x77)),
        ContractAddress::ZERO,
        U256::from(1_000u64),
    );
    let batch = DeploymentBuilder::new(cache)
        .build_spending_limit_batch(wallet, &[allowance])
        .await
        .unwrap();
    assert_eq!(batch.operation(), Operation::DelegateCall);

    let err = GasEstimator::new(transport.clone()).estimate(&batch, wallet).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    assert_eq!(transport.estimate_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_estimate() {
    let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
    let call = deployment_call(transport.clone()).await;
    let transport = Arc::new(MockTransport::new(NetworkId::Fantom).with_latency(Duration::from_secs(2)));
    let estimator = GasEstimator::new(transport);
    let cancel = CancellationToken::new();

    let pending = {
        let cancel = cancel.clone();
        tokio::spawn(async move { estimator.estimate_with_cancel(&call, sender(), &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    assert_eq!(pending.await.unwrap(), Err(ProxyError::Cancelled));
}
