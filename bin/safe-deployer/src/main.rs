//! safe-deployer CLI tool for building wallet proxy deployments
//!
//! Prints encoded transactions as JSON for an external signer to submit; nothing is broadcast.

use clap::Parser;
use safe_deployer::{Error, MainCmd};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let cmd = MainCmd::parse();
    cmd.log_args().init()?;
    cmd.run().await.inspect_err(|e| eprintln!("{e}"))
}
