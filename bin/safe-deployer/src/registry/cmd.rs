use std::{collections::BTreeMap, path::PathBuf};

use clap::Parser;
use safe_proxy::{ContractAddress, ContractRole, NetworkId};
use serde::Serialize;

use crate::common::{print_json, DeployerConfig, LogArgs, Result, CONFIG_ENV};

/// Print the contract registry of a network
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Network to print (name or chain id)
    #[arg(long = "network", short = 'n', env = "SAFE_DEPLOYER_NETWORK", default_value = "fantom")]
    pub network: NetworkId,

    /// JSON config file with per-network endpoints and contract addresses
    #[arg(long = "config", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

#[derive(Debug, Serialize)]
struct Output {
    network: NetworkId,
    chain_id: u64,
    contracts: BTreeMap<ContractRole, ContractAddress>,
}

impl Cmd {
    /// Execute the registry command
    pub fn run(&self) -> Result<()> {
        let config = DeployerConfig::load(self.config.as_deref())?;
        let contracts = config.registry().resolve_registry(self.network)?;
        print_json(&Output { network: self.network, chain_id: self.network.chain_id(), contracts })
    }
}
