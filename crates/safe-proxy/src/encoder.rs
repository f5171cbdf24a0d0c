//! Call encoder: typed operations in, exact ABI payloads out.
//!
//! Everything here is pure. Parameter order and widths follow the deployed v1.3.0 contracts,
//! and the golden vectors in the tests below pin them byte for byte.

use alloy_primitives::{aliases::U96, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use safe_contracts::{
    interfaces::{IAllowanceModule, IGnosisSafe, IGnosisSafeProxyFactory, IMultiSend},
    Operation,
};

use crate::{
    AllowanceParameters, CallKind, ContractAddress, DeploymentSalt, EncodedCall, ProxyError,
    Result, SetupParameters,
};

/// One entry of a batch executed by the batch executor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchCall {
    /// Call or delegate call.
    pub operation: Operation,
    /// Callee.
    pub to: ContractAddress,
    /// Native value forwarded.
    pub value: U256,
    /// Callee payload.
    pub data: Bytes,
}

impl BatchCall {
    /// A zero-value `CALL`.
    pub fn call(to: ContractAddress, data: impl Into<Bytes>) -> Self {
        Self { operation: Operation::Call, to, value: U256::ZERO, data: data.into() }
    }
}

impl From<&EncodedCall> for BatchCall {
    fn from(call: &EncodedCall) -> Self {
        Self {
            operation: call.operation(),
            to: call.target(),
            value: call.value(),
            data: call.data().clone(),
        }
    }
}

/// Encodes the master wallet's `setup` call.
///
/// The eight fields are laid out as `owners, threshold, to, data, fallbackHandler,
/// paymentToken, payment, paymentReceiver`. Without a module setup, `to` is zero and `data`
/// is empty.
pub fn encode_setup(master: ContractAddress, params: &SetupParameters) -> Result<EncodedCall> {
    params.validate()?;

    let (to, data) = params
        .module
        .as_ref()
        .map(|module| (module.to.as_address(), module.data.clone()))
        .unwrap_or((Address::ZERO, Bytes::new()));

    let call = IGnosisSafe::setupCall {
        owners: params.owners.iter().map(ContractAddress::as_address).collect(),
        threshold: U256::from(params.threshold),
        to,
        data,
        fallbackHandler: params.fallback_handler.as_address(),
        paymentToken: params.payment_token.as_address(),
        payment: params.payment,
        paymentReceiver: params.payment_receiver.as_address(),
    };
    Ok(EncodedCall::new(CallKind::Setup, master, call.abi_encode()))
}

/// Encodes the factory's `createProxyWithNonce(master, setup, salt)`.
///
/// `setup` must be a payload produced by [`encode_setup`] for the same master wallet.
pub fn encode_create_proxy_with_nonce(
    factory: ContractAddress,
    master: ContractAddress,
    setup: &EncodedCall,
    salt: DeploymentSalt,
) -> Result<EncodedCall> {
    if setup.kind() != CallKind::Setup {
        return Err(ProxyError::invalid(format!(
            "initializer must be a setup call, got {}",
            setup.kind()
        )));
    }
    if setup.target() != master {
        return Err(ProxyError::invalid(format!(
            "setup call targets {} but the master wallet is {master}",
            setup.target()
        )));
    }
    if master.is_zero() {
        return Err(ProxyError::invalid("master wallet must not be the zero address"));
    }

    let call = IGnosisSafeProxyFactory::createProxyWithNonceCall {
        singleton: master.as_address(),
        initializer: setup.data().clone(),
        saltNonce: salt.as_u256(),
    };
    Ok(EncodedCall::new(CallKind::CreateProxyWithNonce, factory, call.abi_encode()))
}

/// Packs `calls` into a `multiSend` payload for the batch executor.
///
/// The resulting call is a delegate call: the wallet runs the batch executor's code in its
/// own context.
pub fn encode_batch(executor: ContractAddress, calls: &[BatchCall]) -> Result<EncodedCall> {
    if calls.is_empty() {
        return Err(ProxyError::invalid("batch must contain at least one call"));
    }

    let mut packed = Vec::with_capacity(calls.iter().map(|c| 85 + c.data.len()).sum());
    for call in calls {
        packed.push(call.operation.as_u8());
        packed.extend_from_slice(call.to.as_address().as_slice());
        packed.extend_from_slice(&call.value.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&call.data);
    }

    let call = IMultiSend::multiSendCall { transactions: packed.into() };
    Ok(EncodedCall::new(CallKind::MultiSend, executor, call.abi_encode())
        .with_operation(Operation::DelegateCall))
}

/// Encodes `enableModule(module)`, sent by the wallet to itself.
pub fn encode_enable_module(wallet: ContractAddress, module: ContractAddress) -> Result<EncodedCall> {
    if module.is_zero() || module.as_address() == safe_contracts::SENTINEL_ADDRESS {
        return Err(ProxyError::invalid(format!("{module} cannot be enabled as a module")));
    }
    let call = IGnosisSafe::enableModuleCall { module: module.as_address() };
    Ok(EncodedCall::new(CallKind::EnableModule, wallet, call.abi_encode()))
}

/// Encodes the spending-limit module's `addDelegate(delegate)`.
pub fn encode_add_delegate(module: ContractAddress, delegate: ContractAddress) -> Result<EncodedCall> {
    if delegate.is_zero() {
        return Err(ProxyError::invalid("delegate must not be the zero address"));
    }
    let call = IAllowanceModule::addDelegateCall { delegate: delegate.as_address() };
    Ok(EncodedCall::new(CallKind::AddDelegate, module, call.abi_encode()))
}

/// Encodes the spending-limit module's `setAllowance`.
pub fn encode_set_allowance(
    module: ContractAddress,
    allowance: &AllowanceParameters,
) -> Result<EncodedCall> {
    allowance.validate()?;
    let call = IAllowanceModule::setAllowanceCall {
        delegate: allowance.delegate.as_address(),
        token: allowance.token.as_address(),
        allowanceAmount: U96::from(allowance.amount),
        resetTimeMin: allowance.reset_time_min,
        resetBaseMin: allowance.reset_base_min,
    };
    Ok(EncodedCall::new(CallKind::SetAllowance, module, call.abi_encode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    fn addr(byte: u8) -> ContractAddress {
        ContractAddress::new(Address::repeat_byte(byte))
    }

    fn word_addr(byte: u8) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].fill(byte);
        word
    }

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes::<32>()
    }

    fn golden_setup() -> Vec<u8> {
        let mut expected = hex!("b63e800d").to_vec();
        for w in [
            word(0x100),
            word(2),
            word(0),
            word(0x180),
            word_addr(0x44),
            word(0),
            word(0),
            word(0),
            word(3),
            word_addr(0x11),
            word_addr(0x22),
            word_addr(0x33),
            word(0),
        ] {
            expected.extend_from_slice(&w);
        }
        expected
    }

    fn params() -> SetupParameters {
        SetupParameters::new(vec![addr(0x11), addr(0x22), addr(0x33)], 2, addr(0x44))
    }

    /// Owners `[0x11.., 0x22.., 0x33..]`, threshold 2, fallback `0x44..`, no module, no refund.
    #[test]
    fn test_setup_golden_vector() {
        let call = encode_setup(addr(0xaa), &params()).unwrap();
        assert_eq!(call.kind(), CallKind::Setup);
        assert_eq!(call.target(), addr(0xaa));
        assert_eq!(call.len(), 4 + 13 * 32);
        assert_eq!(call.data().as_ref(), golden_setup().as_slice());
    }

    #[test]
    fn test_create_proxy_golden_vector() {
        let master = addr(0xaa);
        let setup = encode_setup(master, &params()).unwrap();
        let call =
            encode_create_proxy_with_nonce(addr(0xbb), master, &setup, DeploymentSalt::from(42u64))
                .unwrap();

        let mut expected = hex!("1688f0b9").to_vec();
        expected.extend_from_slice(&word_addr(0xaa));
        expected.extend_from_slice(&word(0x60));
        expected.extend_from_slice(&word(42));
        expected.extend_from_slice(&word(420));
        expected.extend_from_slice(&golden_setup());
        expected.resize(4 + 4 * 32 + 448, 0);

        assert_eq!(call.target(), addr(0xbb));
        assert_eq!(call.kind(), CallKind::CreateProxyWithNonce);
        assert_eq!(call.data().as_ref(), expected.as_slice());
    }

    #[test]
    fn test_multi_send_golden_vector() {
        let call = encode_batch(addr(0xcc), &[BatchCall::call(addr(0x55), vec![0xde, 0xad])]).unwrap();

        let mut packed = vec![0u8];
        packed.extend_from_slice(&[0x55; 20]);
        packed.extend_from_slice(&word(0));
        packed.extend_from_slice(&word(2));
        packed.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(packed.len(), 87);

        let mut expected = hex!("8d80ff0a").to_vec();
        expected.extend_from_slice(&word(0x20));
        expected.extend_from_slice(&word(87));
        expected.extend_from_slice(&packed);
        expected.resize(4 + 2 * 32 + 96, 0);

        assert_eq!(call.operation(), Operation::DelegateCall);
        assert_eq!(call.data().as_ref(), expected.as_slice());
    }

    #[test]
    fn test_module_setup_fills_to_and_data() {
        let with_module = params().with_module(addr(0x66), vec![0x01, 0x02, 0x03]);
        let call = encode_setup(addr(0xaa), &with_module).unwrap();
        let data = call.data();
        // `to` is the third head word.
        assert_eq!(&data[4 + 64..4 + 96], &word_addr(0x66));
        // owners tail (4 words) then data length then one padded data word
        assert_eq!(call.len(), 4 + 8 * 32 + 4 * 32 + 32 + 32);
    }

    #[test]
    fn test_initializer_must_be_setup_for_the_same_master() {
        let setup = encode_setup(addr(0xaa), &params()).unwrap();
        let err = encode_create_proxy_with_nonce(addr(0xbb), addr(0xab), &setup, DeploymentSalt::from(1u64));
        assert!(matches!(err, Err(ProxyError::InvalidParameters(_))));

        let batch = encode_batch(addr(0xcc), &[BatchCall::from(&setup)]).unwrap();
        let err = encode_create_proxy_with_nonce(addr(0xbb), addr(0xcc), &batch, DeploymentSalt::from(1u64));
        assert!(matches!(err, Err(ProxyError::InvalidParameters(_))));
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert!(matches!(encode_batch(addr(0xcc), &[]), Err(ProxyError::InvalidParameters(_))));
    }

    #[test]
    fn test_set_allowance_layout() {
        let allowance =
            AllowanceParameters::new(addr(0x77), ContractAddress::ZERO, U256::from(1_000)).with_reset(60, 7);
        let call = encode_set_allowance(addr(0xcf), &allowance).unwrap();
        let data = call.data();
        assert_eq!(&data[..4], &IAllowanceModule::setAllowanceCall::SELECTOR);
        assert_eq!(&data[4..36], &word_addr(0x77));
        assert_eq!(&data[36..68], &word(0));
        assert_eq!(&data[68..100], &word(1_000));
        assert_eq!(&data[100..132], &word(60));
        assert_eq!(&data[132..164], &word(7));
    }

    #[test]
    fn test_enable_module_rejects_sentinel() {
        let sentinel = ContractAddress::new(safe_contracts::SENTINEL_ADDRESS);
        assert!(encode_enable_module(addr(0x99), sentinel).is_err());
        let call = encode_enable_module(addr(0x99), addr(0xcf)).unwrap();
        assert_eq!(call.target(), addr(0x99));
        assert_eq!(&call.data()[4..], &word_addr(0xcf));
    }
}
