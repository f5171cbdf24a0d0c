//! Deployment transaction builder.

use std::collections::HashSet;

use tracing::info;

use crate::{
    AllowanceParameters, BatchCall, BatchExecutorContract, ContractAddress, ContractRole,
    DeploymentSalt, EncodedCall, FallbackHandlerContract, InstanceCache, MasterWalletContract,
    ProxyFactoryContract, Result, SetupParameters, SpendingLimitContract,
};

/// Composes encoder output into deployment transactions for an external submitter.
///
/// Handles are re-resolved through the cache on every build, so the addresses always match
/// the active network at build time.
#[derive(Clone, Debug)]
pub struct DeploymentBuilder {
    cache: InstanceCache,
}

impl DeploymentBuilder {
    /// Creates a builder over `cache`.
    pub const fn new(cache: InstanceCache) -> Self {
        Self { cache }
    }

    /// The cache handles are resolved from.
    pub const fn cache(&self) -> &InstanceCache {
        &self.cache
    }

    /// Setup parameters using the active network's default fallback handler and no refund.
    pub async fn default_setup(
        &self,
        owners: Vec<ContractAddress>,
        threshold: u64,
    ) -> Result<SetupParameters> {
        let network = self.cache.active_network();
        let fallback = self.cache.get_handle(ContractRole::FallbackHandler, network).await?;
        let params = SetupParameters::new(owners, threshold, fallback.handler_address()?);
        params.validate()?;
        Ok(params)
    }

    /// Builds the `createProxyWithNonce` call deploying a wallet configured by `params`.
    ///
    /// The output is a pure function of the registry entry, `params` and `salt`.
    pub async fn build_deployment(
        &self,
        params: &SetupParameters,
        salt: DeploymentSalt,
    ) -> Result<EncodedCall> {
        params.validate()?;
        let network = self.cache.active_network();
        let (master, factory) = tokio::try_join!(
            self.cache.get_handle(ContractRole::MasterWallet, network),
            self.cache.get_handle(ContractRole::ProxyFactory, network),
        )?;

        let setup = master.encode_setup(params)?;
        let call = factory.encode_create_proxy_with_nonce(master.address(), &setup, salt)?;
        info!(
            target: "safe_proxy::deployment",
            %network,
            factory = %factory.address(),
            master = %master.address(),
            %salt,
            owners = params.owners.len(),
            threshold = params.threshold,
            "Built deployment call"
        );
        Ok(call)
    }

    /// Asks the factory, through a simulated call, which address the deployment would create.
    pub async fn predict_address(
        &self,
        params: &SetupParameters,
        salt: DeploymentSalt,
    ) -> Result<ContractAddress> {
        let network = self.cache.active_network();
        let (master, factory) = tokio::try_join!(
            self.cache.get_handle(ContractRole::MasterWallet, network),
            self.cache.get_handle(ContractRole::ProxyFactory, network),
        )?;
        let setup = master.encode_setup(params)?;
        factory.predict_proxy_address(master.address(), &setup, salt).await
    }

    /// Builds the batch enabling the spending-limit module on `wallet` and granting each
    /// allowance.
    ///
    /// The batch holds `enableModule`, then one `addDelegate` per distinct delegate, then one
    /// `setAllowance` per allowance. It is meant to be delegate-called by `wallet`.
    pub async fn build_spending_limit_batch(
        &self,
        wallet: ContractAddress,
        allowances: &[AllowanceParameters],
    ) -> Result<EncodedCall> {
        let network = self.cache.active_network();
        let (module, executor) = tokio::try_join!(
            self.cache.get_handle(ContractRole::SpendingLimitModule, network),
            self.cache.get_handle(ContractRole::BatchExecutor, network),
        )?;

        let mut calls =
            vec![BatchCall::from(&crate::encoder::encode_enable_module(wallet, module.address())?)];

        let mut delegates = HashSet::new();
        for allowance in allowances {
            if delegates.insert(allowance.delegate) {
                calls.push(BatchCall::from(&module.encode_add_delegate(allowance.delegate)?));
            }
        }
        for allowance in allowances {
            calls.push(BatchCall::from(&module.encode_set_allowance(allowance)?));
        }

        let batch = executor.encode_batch(&calls)?;
        info!(
            target: "safe_proxy::deployment",
            %network,
            %wallet,
            module = %module.address(),
            entries = calls.len(),
            "Built spending-limit batch"
        );
        Ok(batch)
    }
}
