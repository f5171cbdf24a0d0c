use clap::Parser;
use safe_proxy::{ContractAddress, MasterCopyResolver};

use crate::common::{print_json, LogArgs, NetworkArgs, Result};

/// Resolve the master copy backing a wallet proxy
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Proxy address
    #[arg(value_name = "PROXY")]
    pub proxy: ContractAddress,

    /// Read `masterCopy()` from the proxy instead of asking the indexer
    #[arg(long = "direct")]
    pub direct: bool,

    /// Network configuration
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the master-copy command
    pub async fn run(&self) -> Result<()> {
        let session = self.network_args.connect().await?;
        let indexer = self.network_args.indexer(&session, !self.direct)?;
        let resolver = MasterCopyResolver::new(session.cache, indexer);

        let resolution = if self.direct {
            resolver.resolve_master_copy_direct(self.proxy).await?
        } else {
            resolver.resolve_master_copy(self.proxy).await?
        };
        print_json(&resolution)
    }
}
