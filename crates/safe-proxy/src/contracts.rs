//! Contract handles and the per-role capability traits they expose.

use std::sync::Arc;

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;
use safe_contracts::interfaces::{IAllowanceModule, IGnosisSafe, IGnosisSafeProxyFactory};

use crate::{
    encoder, AllowanceParameters, BatchCall, ContractAddress, ContractRole, DeploymentSalt,
    EncodedCall, NetworkId, NetworkTransport, ProxyError, Result, SetupParameters, TransportError,
};

/// A live binding of a contract role to an address on one network.
///
/// Handles are issued by the [`InstanceCache`](crate::InstanceCache) and carry the cache
/// generation they were issued in, so a handle from before a network switch never compares
/// equal to one issued after it.
#[derive(Clone, derive_more::Debug)]
pub struct ContractHandle {
    role: ContractRole,
    address: ContractAddress,
    network: NetworkId,
    generation: u64,
    #[debug(ignore)]
    transport: Arc<dyn NetworkTransport>,
}

impl PartialEq for ContractHandle {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role &&
            self.address == other.address &&
            self.network == other.network &&
            self.generation == other.generation
    }
}

impl Eq for ContractHandle {}

impl ContractHandle {
    pub(crate) fn new(
        role: ContractRole,
        address: ContractAddress,
        network: NetworkId,
        generation: u64,
        transport: Arc<dyn NetworkTransport>,
    ) -> Self {
        Self { role, address, network, generation, transport }
    }

    /// Logical role.
    pub const fn role(&self) -> ContractRole {
        self.role
    }

    /// Bound address.
    pub const fn address(&self) -> ContractAddress {
        self.address
    }

    /// Network the handle was issued for.
    pub const fn network(&self) -> NetworkId {
        self.network
    }

    /// Cache generation the handle was issued in.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    fn expect_role(&self, role: ContractRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ProxyError::invalid(format!(
                "{} handle at {} cannot act as {role}",
                self.role, self.address
            )))
        }
    }

    /// Read-only call against the bound address.
    async fn read(&self, data: Vec<u8>) -> Result<Bytes> {
        Ok(self.transport.call(self.address, data.into(), None).await?)
    }
}

fn malformed(call: &str, err: alloy_sol_types::Error) -> ProxyError {
    ProxyError::NetworkUnavailable(format!("malformed {call} response: {err}"))
}

/// Capabilities of the master wallet implementation.
#[async_trait::async_trait]
pub trait MasterWalletContract {
    /// Encodes `setup` targeting this master wallet.
    fn encode_setup(&self, params: &SetupParameters) -> Result<EncodedCall>;

    /// Reads the `VERSION()` string of the master copy.
    async fn version(&self) -> Result<String>;
}

/// Capabilities of the proxy factory.
#[async_trait::async_trait]
pub trait ProxyFactoryContract {
    /// Encodes `createProxyWithNonce` targeting this factory.
    fn encode_create_proxy_with_nonce(
        &self,
        master: ContractAddress,
        setup: &EncodedCall,
        salt: DeploymentSalt,
    ) -> Result<EncodedCall>;

    /// Simulates the deployment and returns the address the factory would create.
    ///
    /// A simulation the node rejects (e.g. the proxy already exists for that salt) fails with
    /// [`ProxyError::EstimationFailed`] carrying the node's message.
    async fn predict_proxy_address(
        &self,
        master: ContractAddress,
        setup: &EncodedCall,
        salt: DeploymentSalt,
    ) -> Result<ContractAddress>;
}

/// Capabilities of the default fallback handler.
pub trait FallbackHandlerContract {
    /// Address to install as `fallbackHandler` during setup.
    fn handler_address(&self) -> Result<ContractAddress>;
}

/// Capabilities of the batch executor.
pub trait BatchExecutorContract {
    /// Encodes a delegate-called `multiSend` over `calls`.
    fn encode_batch(&self, calls: &[BatchCall]) -> Result<EncodedCall>;
}

/// Allowance state kept by the spending-limit module for one `(wallet, delegate, token)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenAllowance {
    /// Allowance per period.
    pub amount: U256,
    /// Amount spent in the current period.
    pub spent: U256,
    /// Reset period in minutes.
    pub reset_time_min: U256,
    /// Last reset, in minutes since epoch.
    pub last_reset_min: U256,
    /// Transfer nonce.
    pub nonce: U256,
}

/// Capabilities of the spending-limit module.
#[async_trait::async_trait]
pub trait SpendingLimitContract {
    /// Encodes `addDelegate(delegate)` targeting this module.
    fn encode_add_delegate(&self, delegate: ContractAddress) -> Result<EncodedCall>;

    /// Encodes `setAllowance` targeting this module.
    fn encode_set_allowance(&self, allowance: &AllowanceParameters) -> Result<EncodedCall>;

    /// Reads the current allowance of `delegate` for `token` on `wallet`.
    async fn token_allowance(
        &self,
        wallet: ContractAddress,
        delegate: ContractAddress,
        token: ContractAddress,
    ) -> Result<TokenAllowance>;
}

#[async_trait::async_trait]
impl MasterWalletContract for ContractHandle {
    fn encode_setup(&self, params: &SetupParameters) -> Result<EncodedCall> {
        self.expect_role(ContractRole::MasterWallet)?;
        encoder::encode_setup(self.address, params)
    }

    async fn version(&self) -> Result<String> {
        self.expect_role(ContractRole::MasterWallet)?;
        let output = self.read(IGnosisSafe::VERSIONCall {}.abi_encode()).await?;
        let decoded = IGnosisSafe::VERSIONCall::abi_decode_returns(&output, true)
            .map_err(|err| malformed("VERSION", err))?;
        Ok(decoded.version)
    }
}

#[async_trait::async_trait]
impl ProxyFactoryContract for ContractHandle {
    fn encode_create_proxy_with_nonce(
        &self,
        master: ContractAddress,
        setup: &EncodedCall,
        salt: DeploymentSalt,
    ) -> Result<EncodedCall> {
        self.expect_role(ContractRole::ProxyFactory)?;
        encoder::encode_create_proxy_with_nonce(self.address, master, setup, salt)
    }

    async fn predict_proxy_address(
        &self,
        master: ContractAddress,
        setup: &EncodedCall,
        salt: DeploymentSalt,
    ) -> Result<ContractAddress> {
        let call = self.encode_create_proxy_with_nonce(master, setup, salt)?;
        let output = self
            .transport
            .call(self.address, call.data().clone(), None)
            .await
            .map_err(|err| match err {
                TransportError::Rejected(msg) => ProxyError::EstimationFailed(msg),
                TransportError::Unavailable(msg) => ProxyError::NetworkUnavailable(msg),
            })?;
        let decoded = IGnosisSafeProxyFactory::createProxyWithNonceCall::abi_decode_returns(
            &output, true,
        )
        .map_err(|err| malformed("createProxyWithNonce", err))?;
        Ok(decoded.proxy.into())
    }
}

impl FallbackHandlerContract for ContractHandle {
    fn handler_address(&self) -> Result<ContractAddress> {
        self.expect_role(ContractRole::FallbackHandler)?;
        Ok(self.address)
    }
}

impl BatchExecutorContract for ContractHandle {
    fn encode_batch(&self, calls: &[BatchCall]) -> Result<EncodedCall> {
        self.expect_role(ContractRole::BatchExecutor)?;
        encoder::encode_batch(self.address, calls)
    }
}

#[async_trait::async_trait]
impl SpendingLimitContract for ContractHandle {
    fn encode_add_delegate(&self, delegate: ContractAddress) -> Result<EncodedCall> {
        self.expect_role(ContractRole::SpendingLimitModule)?;
        encoder::encode_add_delegate(self.address, delegate)
    }

    fn encode_set_allowance(&self, allowance: &AllowanceParameters) -> Result<EncodedCall> {
        self.expect_role(ContractRole::SpendingLimitModule)?;
        encoder::encode_set_allowance(self.address, allowance)
    }

    async fn token_allowance(
        &self,
        wallet: ContractAddress,
        delegate: ContractAddress,
        token: ContractAddress,
    ) -> Result<TokenAllowance> {
        self.expect_role(ContractRole::SpendingLimitModule)?;
        let call = IAllowanceModule::getTokenAllowanceCall {
            safe: wallet.as_address(),
            delegate: delegate.as_address(),
            token: token.as_address(),
        };
        let output = self.read(call.abi_encode()).await?;
        let [amount, spent, reset_time_min, last_reset_min, nonce] =
            IAllowanceModule::getTokenAllowanceCall::abi_decode_returns(&output, true)
                .map_err(|err| malformed("getTokenAllowance", err))?
                .allowance;
        Ok(TokenAllowance { amount, spent, reset_time_min, last_reset_min, nonce })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockTransport;
    use alloy_primitives::Address;
    use alloy_sol_types::SolValue;

    fn handle(role: ContractRole, transport: Arc<MockTransport>) -> ContractHandle {
        ContractHandle::new(
            role,
            ContractAddress::new(Address::repeat_byte(0xaa)),
            NetworkId::Fantom,
            0,
            transport,
        )
    }

    #[test]
    fn test_wrong_role_is_invalid() {
        let factory = handle(ContractRole::ProxyFactory, Arc::new(MockTransport::new(NetworkId::Fantom)));
        let params = SetupParameters::new(
            vec![ContractAddress::new(Address::repeat_byte(0x11))],
            1,
            ContractAddress::ZERO,
        );
        assert!(matches!(factory.encode_setup(&params), Err(ProxyError::InvalidParameters(_))));
        assert!(matches!(factory.handler_address(), Err(ProxyError::InvalidParameters(_))));
    }

    #[test]
    fn test_generation_is_part_of_identity() {
        let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
        let a = handle(ContractRole::MasterWallet, transport.clone());
        let mut b = handle(ContractRole::MasterWallet, transport);
        assert_eq!(a, b);
        b.generation = 1;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_version_reads_master_copy() {
        let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
        let master = handle(ContractRole::MasterWallet, transport.clone());
        transport.set_call_response(
            master.address(),
            IGnosisSafe::VERSIONCall::SELECTOR,
            Ok(("1.3.0".to_string(),).abi_encode_params().into()),
        );
        assert_eq!(master.version().await.unwrap(), "1.3.0");
    }

    #[tokio::test]
    async fn test_predict_rejection_is_estimation_failure() {
        let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
        let master = handle(ContractRole::MasterWallet, transport.clone());
        let factory = ContractHandle::new(
            ContractRole::ProxyFactory,
            ContractAddress::new(Address::repeat_byte(0xbb)),
            NetworkId::Fantom,
            0,
            transport.clone(),
        );
        transport.set_call_response(
            factory.address(),
            IGnosisSafeProxyFactory::createProxyWithNonceCall::SELECTOR,
            Err(TransportError::Rejected("execution reverted: Create2 call failed".into())),
        );
        let params = SetupParameters::new(
            vec![ContractAddress::new(Address::repeat_byte(0x11))],
            1,
            ContractAddress::ZERO,
        );
        let setup = master.encode_setup(&params).unwrap();
        let err = factory
            .predict_proxy_address(master.address(), &setup, DeploymentSalt::from(1u64))
            .await
            .unwrap_err();
        assert_eq!(err, ProxyError::EstimationFailed("execution reverted: Create2 call failed".into()));
    }
}
