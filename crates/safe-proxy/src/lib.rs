//! Deployment and resolution layer for multisig wallet proxies.
//!
//! Builds the exact call sequence that deploys a wallet proxy at a deterministic address,
//! resolves the master copy backing an existing proxy, estimates gas with a safety margin, and
//! keeps the contract handles of the active network in an [`InstanceCache`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod encoder;
pub use encoder::BatchCall;

mod cache;
pub use cache::*;

mod contracts;
pub use contracts::*;

mod deployment;
pub use deployment::*;

mod error;
pub use error::*;

mod gas;
pub use gas::*;

mod params;
pub use params::*;

mod registry;
pub use registry::*;

mod resolver;
pub use resolver::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod transport;
pub use transport::*;

mod types;
pub use types::*;

pub use safe_contracts::{Operation, SENTINEL_ADDRESS};
