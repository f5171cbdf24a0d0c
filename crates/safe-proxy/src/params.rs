//! Caller-supplied parameters for wallet setup and spending limits.

use std::collections::HashSet;

use alloy_primitives::{Bytes, U256};
use safe_contracts::SENTINEL_ADDRESS;
use serde::{Deserialize, Serialize};

use crate::{ContractAddress, ProxyError, Result};

/// Largest allowance the spending-limit module can store (`uint96`).
pub const MAX_ALLOWANCE: U256 = U256::from_limbs([u64::MAX, u32::MAX as u64, 0, 0]);

/// A delegate call the new wallet performs during `setup`, typically to enable modules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSetup {
    /// Contract the wallet delegate-calls.
    pub to: ContractAddress,
    /// Payload of the delegate call.
    pub data: Bytes,
}

/// Arguments of the master wallet's `setup` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetupParameters {
    /// Wallet owners, in order.
    pub owners: Vec<ContractAddress>,
    /// Number of confirmations required.
    pub threshold: u64,
    /// Optional delegate call made during setup.
    pub module: Option<ModuleSetup>,
    /// Fallback handler installed on the wallet.
    pub fallback_handler: ContractAddress,
    /// Token used to refund the deployer, zero for the native coin.
    pub payment_token: ContractAddress,
    /// Refund amount.
    pub payment: U256,
    /// Refund receiver, zero for `tx.origin`.
    pub payment_receiver: ContractAddress,
}

impl SetupParameters {
    /// Parameters with no module and no deployment refund.
    pub fn new(
        owners: Vec<ContractAddress>,
        threshold: u64,
        fallback_handler: ContractAddress,
    ) -> Self {
        Self {
            owners,
            threshold,
            module: None,
            fallback_handler,
            payment_token: ContractAddress::ZERO,
            payment: U256::ZERO,
            payment_receiver: ContractAddress::ZERO,
        }
    }

    /// Adds a setup-time delegate call.
    pub fn with_module(mut self, to: ContractAddress, data: impl Into<Bytes>) -> Self {
        self.module = Some(ModuleSetup { to, data: data.into() });
        self
    }

    /// Sets the deployment refund.
    pub const fn with_payment(
        mut self,
        token: ContractAddress,
        amount: U256,
        receiver: ContractAddress,
    ) -> Self {
        self.payment_token = token;
        self.payment = amount;
        self.payment_receiver = receiver;
        self
    }

    /// Checks every invariant the master wallet enforces on `setup`.
    pub fn validate(&self) -> Result<()> {
        if self.owners.is_empty() {
            return Err(ProxyError::invalid("owners must not be empty"));
        }
        if self.threshold == 0 {
            return Err(ProxyError::invalid("threshold must be at least 1"));
        }
        if self.threshold > self.owners.len() as u64 {
            return Err(ProxyError::invalid(format!(
                "threshold {} exceeds owner count {}",
                self.threshold,
                self.owners.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.owners.len());
        for owner in &self.owners {
            if owner.is_zero() {
                return Err(ProxyError::invalid("owner must not be the zero address"));
            }
            if owner.as_address() == SENTINEL_ADDRESS {
                return Err(ProxyError::invalid("owner must not be the sentinel address"));
            }
            if !seen.insert(*owner) {
                return Err(ProxyError::invalid(format!("duplicate owner {owner}")));
            }
        }

        if self.fallback_handler.as_address() == SENTINEL_ADDRESS {
            return Err(ProxyError::invalid("fallback handler must not be the sentinel address"));
        }
        if let Some(module) = &self.module {
            if module.to.is_zero() {
                return Err(ProxyError::invalid("module setup target must not be the zero address"));
            }
        }
        Ok(())
    }
}

/// One allowance granted through the spending-limit module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowanceParameters {
    /// Account allowed to spend.
    pub delegate: ContractAddress,
    /// Token being spent, zero for the native coin.
    pub token: ContractAddress,
    /// Amount per period. Must fit in 96 bits.
    pub amount: U256,
    /// Reset period in minutes, zero for a one-time allowance.
    pub reset_time_min: u16,
    /// Base of the reset period, in minutes since epoch.
    pub reset_base_min: u32,
}

impl AllowanceParameters {
    /// A one-time allowance.
    pub const fn new(delegate: ContractAddress, token: ContractAddress, amount: U256) -> Self {
        Self { delegate, token, amount, reset_time_min: 0, reset_base_min: 0 }
    }

    /// Makes the allowance recurring.
    pub const fn with_reset(mut self, reset_time_min: u16, reset_base_min: u32) -> Self {
        self.reset_time_min = reset_time_min;
        self.reset_base_min = reset_base_min;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.delegate.is_zero() {
            return Err(ProxyError::invalid("delegate must not be the zero address"));
        }
        if self.amount > MAX_ALLOWANCE {
            return Err(ProxyError::invalid(format!(
                "allowance {} does not fit in 96 bits",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn owner(byte: u8) -> ContractAddress {
        ContractAddress::new(Address::repeat_byte(byte))
    }

    #[test]
    fn test_max_allowance_is_uint96_max() {
        assert_eq!(MAX_ALLOWANCE, (U256::from(1) << 96) - U256::from(1));
    }

    #[test]
    fn test_threshold_equal_to_owner_count_is_valid() {
        let params = SetupParameters::new(vec![owner(0x11), owner(0x22)], 2, ContractAddress::ZERO);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_sentinel_owner_is_rejected() {
        let params = SetupParameters::new(
            vec![owner(0x11), ContractAddress::new(SENTINEL_ADDRESS)],
            1,
            ContractAddress::ZERO,
        );
        assert!(matches!(params.validate(), Err(ProxyError::InvalidParameters(_))));
    }

    #[test]
    fn test_zero_module_target_is_rejected() {
        let params = SetupParameters::new(vec![owner(0x11)], 1, ContractAddress::ZERO)
            .with_module(ContractAddress::ZERO, vec![0x01]);
        assert!(matches!(params.validate(), Err(ProxyError::InvalidParameters(_))));
    }

    #[test]
    fn test_allowance_above_uint96_is_rejected() {
        let ok = AllowanceParameters::new(owner(0x55), ContractAddress::ZERO, MAX_ALLOWANCE);
        assert!(ok.validate().is_ok());

        let too_big =
            AllowanceParameters::new(owner(0x55), ContractAddress::ZERO, MAX_ALLOWANCE + U256::from(1));
        assert!(too_big.validate().is_err());
    }
}
