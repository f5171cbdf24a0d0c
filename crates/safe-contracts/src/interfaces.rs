//! Solidity interfaces of the external wallet programs.
//!
//! Parameter order and widths are fixed by the deployed bytecode. Changing any declaration here
//! changes the selector or the layout of the encoded payload.

use alloy_sol_types::sol;

sol! {
    /// Master wallet implementation (v1.3.0 layout).
    interface IGnosisSafe {
        /// Initializes a freshly deployed proxy.
        function setup(
            address[] owners,
            uint256 threshold,
            address to,
            bytes data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address paymentReceiver
        ) external;

        /// Semantic version of the master copy.
        function VERSION() external view returns (string version);

        /// Adds a module to the wallet's allow list. Only callable by the wallet itself.
        function enableModule(address module) external;
    }

    /// Proxy factory deploying proxies deterministically from `(singleton, initializer, saltNonce)`.
    interface IGnosisSafeProxyFactory {
        /// Deploys a proxy and calls `initializer` on it.
        function createProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);

        /// Creation code of the proxy contract.
        function proxyCreationCode() external pure returns (bytes code);
    }

    /// The proxy itself answers this selector with the address it delegates to.
    interface IGnosisSafeProxy {
        /// Master copy currently backing the proxy.
        function masterCopy() external view returns (address implementation);
    }

    /// Batch executor. `transactions` is the packed concatenation of
    /// `uint8 operation | address to | uint256 value | uint256 dataLength | bytes data`.
    interface IMultiSend {
        /// Executes every packed transaction, reverting the whole batch on any failure.
        function multiSend(bytes transactions) external payable;
    }

    /// Spending-limit (allowance) module.
    interface IAllowanceModule {
        /// Registers a delegate that may spend allowances of the calling wallet.
        function addDelegate(address delegate) external;

        /// Sets the allowance of `delegate` for `token`, refilled every `resetTimeMin` minutes.
        function setAllowance(
            address delegate,
            address token,
            uint96 allowanceAmount,
            uint16 resetTimeMin,
            uint32 resetBaseMin
        ) external;

        /// `[amount, spent, resetTimeMin, lastResetMin, nonce]` of an allowance.
        function getTokenAllowance(address safe, address delegate, address token)
            external
            view
            returns (uint256[5] allowance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_selectors_match_deployed_contracts() {
        assert_eq!(IGnosisSafe::setupCall::SELECTOR, [0xb6, 0x3e, 0x80, 0x0d]);
        assert_eq!(IGnosisSafeProxyFactory::createProxyWithNonceCall::SELECTOR, [0x16, 0x88, 0xf0, 0xb9]);
        assert_eq!(IGnosisSafeProxy::masterCopyCall::SELECTOR, [0xa6, 0x19, 0x48, 0x6e]);
        assert_eq!(IMultiSend::multiSendCall::SELECTOR, [0x8d, 0x80, 0xff, 0x0a]);
    }
}
