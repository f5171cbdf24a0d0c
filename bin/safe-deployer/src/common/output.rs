use alloy_primitives::{Bytes, U256};
use safe_proxy::{ContractAddress, EncodedCall, GasEstimate, NetworkId};
use serde::Serialize;

use super::Result;

/// JSON rendering of an encoded call, ready for an external submitter
#[derive(Debug, Clone, Serialize)]
pub struct CallOutput {
    /// Network the call was built for
    pub network: NetworkId,
    /// Solidity function being called
    pub kind: String,
    /// Address the payload is sent to
    pub to: ContractAddress,
    /// Native value
    pub value: U256,
    /// `0` for CALL, `1` for DELEGATECALL
    pub operation: u8,
    /// Payload length in bytes
    pub data_length: usize,
    /// Raw payload
    pub data: Bytes,
    /// Gas estimate, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<GasEstimate>,
    /// Address the factory would deploy to, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_address: Option<ContractAddress>,
}

impl CallOutput {
    /// Renders `call` built on `network`.
    pub fn new(network: NetworkId, call: &EncodedCall) -> Self {
        Self {
            network,
            kind: call.kind().to_string(),
            to: call.target(),
            value: call.value(),
            operation: call.operation().as_u8(),
            data_length: call.len(),
            data: call.data().clone(),
            gas: None,
            predicted_address: None,
        }
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
