//! Spending-limit command: builds the batch enabling allowances on an existing wallet.

mod cmd;

pub use cmd::*;
