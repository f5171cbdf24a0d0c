//! Registry command: prints the contract addresses of a network.

mod cmd;

pub use cmd::*;
