//! Deploy command: builds the `createProxyWithNonce` transaction for a new wallet.

mod cmd;

pub use cmd::*;
