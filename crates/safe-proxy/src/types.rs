//! Value types shared by every component of the deployment layer.

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use alloy_primitives::{Address, Bytes, U256};
use safe_contracts::Operation;
use serde::{Deserialize, Serialize};

/// A supported ledger network. Exactly one network is active per [`InstanceCache`].
///
/// Equality, ordering and hashing go through [`NetworkId::chain_id`], so
/// `NetworkId::Custom(1) == NetworkId::Mainnet`.
///
/// [`InstanceCache`]: crate::InstanceCache
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NetworkId {
    /// Ethereum mainnet.
    Mainnet,
    /// Ethereum Sepolia testnet.
    Sepolia,
    /// Gnosis chain.
    Gnosis,
    /// Fantom Opera.
    Fantom,
    /// Fantom testnet.
    FantomTestnet,
    /// Any other network, identified by its chain id.
    Custom(u64),
}

impl NetworkId {
    /// Networks with a well-known name.
    pub const NAMED: [Self; 5] =
        [Self::Mainnet, Self::Sepolia, Self::Gnosis, Self::Fantom, Self::FantomTestnet];

    /// The EIP-155 chain id.
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Sepolia => 11_155_111,
            Self::Gnosis => 100,
            Self::Fantom => 250,
            Self::FantomTestnet => 4002,
            Self::Custom(id) => id,
        }
    }

    /// Maps a chain id to its named variant when one exists.
    pub const fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            1 => Self::Mainnet,
            11_155_111 => Self::Sepolia,
            100 => Self::Gnosis,
            250 => Self::Fantom,
            4002 => Self::FantomTestnet,
            id => Self::Custom(id),
        }
    }

    /// Short lowercase name, `None` for custom networks.
    pub const fn name(self) -> Option<&'static str> {
        match Self::from_chain_id(self.chain_id()) {
            Self::Mainnet => Some("mainnet"),
            Self::Sepolia => Some("sepolia"),
            Self::Gnosis => Some("gnosis"),
            Self::Fantom => Some("fantom"),
            Self::FantomTestnet => Some("ftmtestnet"),
            Self::Custom(_) => None,
        }
    }
}

impl PartialEq for NetworkId {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id() == other.chain_id()
    }
}

impl Eq for NetworkId {}

impl Hash for NetworkId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id().hash(state);
    }
}

impl PartialOrd for NetworkId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NetworkId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain_id().cmp(&other.chain_id())
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.chain_id()),
            None => write!(f, "chain({})", self.chain_id()),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.chain_id()),
        }
    }
}

/// Error returned when a network name or chain id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network '{0}': expected a network name or a decimal chain id")]
pub struct ParseNetworkError(String);

impl FromStr for NetworkId {
    type Err = ParseNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let network = match normalized.as_str() {
            "mainnet" | "ethereum" => Self::Mainnet,
            "sepolia" => Self::Sepolia,
            "gnosis" | "xdai" => Self::Gnosis,
            "fantom" | "opera" => Self::Fantom,
            "ftmtestnet" | "fantom-testnet" => Self::FantomTestnet,
            other => other
                .parse::<u64>()
                .map(Self::from_chain_id)
                .map_err(|_| ParseNetworkError(s.to_string()))?,
        };
        Ok(network)
    }
}

impl TryFrom<String> for NetworkId {
    type Error = ParseNetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkId> for String {
    fn from(value: NetworkId) -> Self {
        value.to_string()
    }
}

/// A contract (or account) address.
///
/// Parsing is case-insensitive; rendering is always the EIP-55 checksummed form.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::From, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ContractAddress(Address);

impl ContractAddress {
    /// The zero address.
    pub const ZERO: Self = Self(Address::ZERO);

    /// Wraps a raw address.
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// The underlying 20-byte address.
    pub const fn as_address(&self) -> Address {
        self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// EIP-55 checksummed text.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<ContractAddress> for Address {
    fn from(value: ContractAddress) -> Self {
        value.0
    }
}

impl fmt::Debug for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

/// Error returned for malformed address text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid address '{input}': {reason}")]
pub struct ParseAddressError {
    input: String,
    reason: &'static str,
}

impl FromStr for ContractAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let error = |reason| ParseAddressError { input: s.to_string(), reason };

        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| error("missing 0x prefix"))?;
        if hex.len() != 40 {
            return Err(error("expected 40 hex digits"));
        }
        let address = Address::from_str(hex).map_err(|_| error("not a hex string"))?;
        Ok(Self(address))
    }
}

impl TryFrom<String> for ContractAddress {
    type Error = ParseAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContractAddress> for String {
    fn from(value: ContractAddress) -> Self {
        value.to_checksum()
    }
}

/// Logical role of a long-lived contract on a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    /// Master wallet implementation proxies delegate to.
    MasterWallet,
    /// Factory deploying proxies.
    ProxyFactory,
    /// Default fallback handler installed on new wallets.
    FallbackHandler,
    /// Batch executor.
    BatchExecutor,
    /// Optional spending-limit module.
    SpendingLimitModule,
}

impl ContractRole {
    /// Every role, in registry order.
    pub const ALL: [Self; 5] = [
        Self::MasterWallet,
        Self::ProxyFactory,
        Self::FallbackHandler,
        Self::BatchExecutor,
        Self::SpendingLimitModule,
    ];

    /// Snake-case name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MasterWallet => "master_wallet",
            Self::ProxyFactory => "proxy_factory",
            Self::FallbackHandler => "fallback_handler",
            Self::BatchExecutor => "batch_executor",
            Self::SpendingLimitModule => "spending_limit_module",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-chosen nonce mixed into the proxy address derivation by the factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct DeploymentSalt(U256);

impl DeploymentSalt {
    /// Wraps a salt nonce.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// The salt as the factory's `uint256 saltNonce`.
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for DeploymentSalt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for DeploymentSalt {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

/// Human-readable tag of an encoded call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Master wallet `setup`.
    Setup,
    /// Factory `createProxyWithNonce`.
    CreateProxyWithNonce,
    /// Batch executor `multiSend`.
    MultiSend,
    /// Wallet `enableModule`.
    EnableModule,
    /// Spending-limit `addDelegate`.
    AddDelegate,
    /// Spending-limit `setAllowance`.
    SetAllowance,
}

impl CallKind {
    /// The Solidity function name of the call.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::CreateProxyWithNonce => "createProxyWithNonce",
            Self::MultiSend => "multiSend",
            Self::EnableModule => "enableModule",
            Self::AddDelegate => "addDelegate",
            Self::SetAllowance => "setAllowance",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully encoded call, ready for estimation or for an external submitter.
///
/// Immutable once built; two calls are equal when every byte of the payload and every
/// addressing field match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedCall {
    kind: CallKind,
    target: ContractAddress,
    value: U256,
    data: Bytes,
    operation: Operation,
}

impl EncodedCall {
    /// A plain `CALL` with zero value.
    pub fn new(kind: CallKind, target: ContractAddress, data: impl Into<Bytes>) -> Self {
        Self { kind, target, value: U256::ZERO, data: data.into(), operation: Operation::Call }
    }

    /// Returns the call with the given operation.
    pub const fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Returns the call with the given native value.
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Operation tag.
    pub const fn kind(&self) -> CallKind {
        self.kind
    }

    /// Address the payload is sent to.
    pub const fn target(&self) -> ContractAddress {
        self.target
    }

    /// Native value attached to the call.
    pub const fn value(&self) -> U256 {
        self.value
    }

    /// Raw payload.
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Call or delegate call.
    pub const fn operation(&self) -> Operation {
        self.operation
    }
}

/// Gas estimate with the safety margin applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    /// Raw estimate reported by the network.
    pub estimated: u64,
    /// Gas limit to submit with, `estimated * SAFETY_MULTIPLIER`.
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fantom", NetworkId::Fantom)]
    #[case("Opera", NetworkId::Fantom)]
    #[case("ftmtestnet", NetworkId::FantomTestnet)]
    #[case("4002", NetworkId::FantomTestnet)]
    #[case("1", NetworkId::Mainnet)]
    #[case("31337", NetworkId::Custom(31337))]
    fn test_parse_network(#[case] input: &str, #[case] expected: NetworkId) {
        assert_eq!(input.parse::<NetworkId>().unwrap(), expected);
    }

    #[test]
    fn test_custom_network_equals_named_variant() {
        assert_eq!(NetworkId::Custom(250), NetworkId::Fantom);
        assert_eq!(NetworkId::Custom(250).to_string(), "fantom");
        assert!("not-a-network".parse::<NetworkId>().is_err());
    }

    #[test]
    fn test_address_parsing_is_case_insensitive() {
        let lower: ContractAddress = "0xd9db270c1b5e3bd161e8c8503c55ceabee709552".parse().unwrap();
        let upper: ContractAddress = "0XD9DB270C1B5E3BD161E8C8503C55CEABEE709552".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_string(), "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552");
    }

    #[rstest]
    #[case("d9db270c1b5e3bd161e8c8503c55ceabee709552")]
    #[case("0xd9db270c1b5e3bd161e8c8503c55ceabee7095")]
    #[case("0xzzdb270c1b5e3bd161e8c8503c55ceabee709552")]
    fn test_malformed_addresses_are_rejected(#[case] input: &str) {
        assert!(input.parse::<ContractAddress>().is_err());
    }

    #[test]
    fn test_address_serde_uses_checksum() {
        let address: ContractAddress = "0xa6b71e26c5e0845f74c812102ca7114b6a896ab2".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2\"");
        assert_eq!(serde_json::from_str::<ContractAddress>(&json).unwrap(), address);
    }
}
