//! Command-line deployment and inspection of multisig wallet proxies.
//!
//! The binary wires the `safe-proxy` core to concrete collaborators: a JSON-RPC transport, the
//! client gateway as indexer, and a JSON configuration of per-network endpoints.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cmd;
pub use cmd::*;

/// Shared arguments, configuration, collaborators and errors
pub mod common;

/// Deploy command
pub mod deploy;

/// Master-copy command
pub mod master_copy;

/// Registry command
pub mod registry;

/// Spending-limit command
pub mod spending_limit;
