//! Canonical deployments of the wallet contracts.
//!
//! The v1.3.0 contracts were deployed through a deterministic deployment proxy, so they share
//! the same address on every network that carries them. Chains that rely on event indexing use
//! the L2 flavour of the master copy.

use alloy_primitives::{address, Address};

/// Master copy emitting no per-transaction events (Ethereum L1 flavour).
pub const SAFE_MASTER_COPY_V1_3_0: Address = address!("0xd9db270c1b5e3bd161e8c8503c55ceabee709552");

/// Master copy emitting `SafeMultiSigTransaction` events (L2 flavour).
pub const SAFE_L2_MASTER_COPY_V1_3_0: Address =
    address!("0x3e5c63644e683549055b9be8653de26e0b4cd36e");

/// Proxy factory.
pub const PROXY_FACTORY_V1_3_0: Address = address!("0xa6b71e26c5e0845f74c812102ca7114b6a896ab2");

/// Default fallback handler installed on new wallets.
pub const COMPATIBILITY_FALLBACK_HANDLER_V1_3_0: Address =
    address!("0xf48f2b2d2a534e402487b3ee7c18c33aec0fe5e4");

/// Batch executor.
pub const MULTI_SEND_V1_3_0: Address = address!("0xa238cbeb142c10ef7ad8442c6d1f9e89e07e7761");

/// Spending-limit module on Ethereum mainnet.
pub const ALLOWANCE_MODULE_MAINNET: Address =
    address!("0xcfbfac74c26f8647cbdb8c5caf80bb5b32e43134");

/// Addresses of every contract a deployment needs on one network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Master wallet implementation the proxies delegate to.
    pub master_copy: Address,
    /// Proxy factory.
    pub proxy_factory: Address,
    /// Default fallback handler.
    pub fallback_handler: Address,
    /// Batch executor.
    pub multi_send: Address,
    /// Spending-limit module, when deployed on that network.
    pub allowance_module: Option<Address>,
}

const L1: Deployment = Deployment {
    master_copy: SAFE_MASTER_COPY_V1_3_0,
    proxy_factory: PROXY_FACTORY_V1_3_0,
    fallback_handler: COMPATIBILITY_FALLBACK_HANDLER_V1_3_0,
    multi_send: MULTI_SEND_V1_3_0,
    allowance_module: None,
};

const L2: Deployment = Deployment { master_copy: SAFE_L2_MASTER_COPY_V1_3_0, ..L1 };

/// Returns the canonical deployment for `chain_id`, if the contracts are known to exist there.
pub const fn canonical_deployment(chain_id: u64) -> Option<Deployment> {
    match chain_id {
        1 => Some(Deployment { allowance_module: Some(ALLOWANCE_MODULE_MAINNET), ..L1 }),
        11_155_111 => Some(L1),
        100 | 250 | 4002 => Some(L2),
        _ => None,
    }
}
