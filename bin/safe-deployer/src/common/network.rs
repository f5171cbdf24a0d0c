use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use safe_proxy::{Indexer, InstanceCache, NetworkId};
use tracing::info;

use super::{
    DeployerConfig, DeployerError, GatewayIndexer, Result, RpcTransport, UnconfiguredIndexer,
    CONFIG_ENV,
};

/// Network selection and endpoint arguments shared by every command
#[derive(Parser, Debug, Clone)]
pub struct NetworkArgs {
    /// Network to operate on (name or chain id). Detected from the RPC endpoint when omitted.
    #[arg(long = "network", short = 'n', env = "SAFE_DEPLOYER_NETWORK")]
    pub network: Option<NetworkId>,

    /// JSON config file with per-network endpoints and contract addresses
    #[arg(long = "config", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint, overriding the configured one
    #[arg(long = "rpc")]
    pub rpc: Option<String>,

    /// Client gateway endpoint, overriding the configured one
    #[arg(long = "indexer")]
    pub indexer: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", default_value = "30")]
    pub timeout: u64,
}

/// Collaborators wired for one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded configuration.
    pub config: DeployerConfig,
    /// Handle cache bound to the selected network.
    pub cache: InstanceCache,
}

impl NetworkArgs {
    /// Loads the configuration file, if any.
    pub fn load_config(&self) -> Result<DeployerConfig> {
        DeployerConfig::load(self.config.as_deref())
    }

    /// Connects to the RPC endpoint and binds an instance cache to the selected network.
    ///
    /// Without `--network`, the network is whatever the endpoint reports, which requires an
    /// explicit `--rpc`.
    pub async fn connect(&self) -> Result<Session> {
        let config = self.load_config()?;
        let timeout = Duration::from_secs(self.timeout);

        let session = match self.network {
            Some(network) => {
                let url = config.rpc_url(network, self.rpc.as_deref())?;
                let transport = Arc::new(RpcTransport::new(url, timeout));
                let cache = InstanceCache::new(transport, config.registry(), network);
                Session { config, cache }
            }
            None => {
                let rpc = self.rpc.as_deref().ok_or_else(|| {
                    DeployerError::InvalidInput("either --network or --rpc is required".to_string())
                })?;
                let url = rpc.parse().map_err(|err| {
                    DeployerError::InvalidInput(format!("invalid RPC URL '{rpc}': {err}"))
                })?;
                let transport = Arc::new(RpcTransport::new(url, timeout));
                let cache = InstanceCache::new(transport, config.registry(), NetworkId::Mainnet);
                let network = cache.detect_network().await?;
                info!(target: "safe_deployer", %network, "Detected network");
                Session { config, cache }
            }
        };
        Ok(session)
    }

    /// Indexer of the session's network. With `required == false`, a missing endpoint yields an
    /// indexer that reports every lookup as transient.
    pub fn indexer(&self, session: &Session, required: bool) -> Result<Arc<dyn Indexer>> {
        let network = session.cache.active_network();
        match session.config.indexer_url(network, self.indexer.as_deref()) {
            Ok(url) => {
                let indexer = GatewayIndexer::new(url, Duration::from_secs(self.timeout))
                    .map_err(|err| DeployerError::InvalidInput(err.to_string()))?;
                Ok(Arc::new(indexer))
            }
            Err(DeployerError::MissingEndpoint { .. }) if !required => Ok(Arc::new(UnconfiguredIndexer)),
            Err(err) => Err(err),
        }
    }
}
