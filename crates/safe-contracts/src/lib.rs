//! ABI bindings for the multisig wallet contracts.
//!
//! The wallet programs are deployed once per network and never change, so everything here is a
//! plain constant or a `sol!`-generated call type. The crate performs no I/O.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]
#![deny(unused_must_use)]

pub use alloy_primitives;
pub use alloy_sol_types;

pub mod deployments;
pub mod interfaces;

use alloy_primitives::{address, Address};

/// Head of the owner and module linked lists kept by the master wallet. The master wallet rejects
/// it as an owner, module or fallback handler.
pub const SENTINEL_ADDRESS: Address = address!("0x0000000000000000000000000000000000000001");

/// Operation byte understood by the master wallet and the batch executor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    /// Regular `CALL`.
    #[default]
    Call = 0,
    /// `DELEGATECALL` into the target.
    DelegateCall = 1,
}

impl Operation {
    /// The single byte used in packed batch encodings.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
