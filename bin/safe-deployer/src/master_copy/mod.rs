//! Master-copy command: reports the implementation behind an existing proxy.

mod cmd;

pub use cmd::*;
