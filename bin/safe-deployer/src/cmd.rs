use clap::Parser;

use crate::common::LogArgs;

/// Main command enumeration for the safe-deployer CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version = "0.1")]
pub enum MainCmd {
    /// Build the transaction deploying a new wallet proxy
    Deploy(crate::deploy::Cmd),
    /// Resolve the master copy backing a wallet proxy
    MasterCopy(crate::master_copy::Cmd),
    /// Print the contract registry of a network
    Registry(crate::registry::Cmd),
    /// Build the batch enabling the spending-limit module on a wallet
    SpendingLimit(crate::spending_limit::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command error
    #[error("{0}")]
    Deployer(#[from] crate::common::DeployerError),
}

impl MainCmd {
    /// Logging configuration of the selected command
    pub const fn log_args(&self) -> &LogArgs {
        match self {
            Self::Deploy(cmd) => &cmd.log_args,
            Self::MasterCopy(cmd) => &cmd.log_args,
            Self::Registry(cmd) => &cmd.log_args,
            Self::SpendingLimit(cmd) => &cmd.log_args,
        }
    }

    /// Execute the main command
    pub async fn run(&self) -> Result<(), Error> {
        match self {
            Self::Deploy(cmd) => cmd.run().await?,
            Self::MasterCopy(cmd) => cmd.run().await?,
            Self::Registry(cmd) => cmd.run()?,
            Self::SpendingLimit(cmd) => cmd.run().await?,
        }
        Ok(())
    }
}
