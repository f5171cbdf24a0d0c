use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Bytes, U256};
use clap::Parser;
use safe_proxy::{
    ContractAddress, DeploymentBuilder, DeploymentSalt, GasEstimator, SetupParameters,
};
use tracing::info;

use crate::common::{print_json, CallOutput, DeployerError, LogArgs, NetworkArgs, Result};

/// Build the transaction deploying a new wallet proxy
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Wallet owner. Repeat the flag or separate addresses with commas.
    #[arg(long = "owner", required = true, value_delimiter = ',')]
    pub owners: Vec<ContractAddress>,

    /// Confirmations required to execute a wallet transaction
    #[arg(long = "threshold", short = 't')]
    pub threshold: u64,

    /// Salt nonce mixed into the proxy address. Defaults to the current time in milliseconds.
    #[arg(long = "salt")]
    pub salt: Option<U256>,

    /// Fallback handler, overriding the network default
    #[arg(long = "fallback-handler")]
    pub fallback_handler: Option<ContractAddress>,

    /// Contract the new wallet delegate-calls during setup
    #[arg(long = "module-to", requires = "module_data")]
    pub module_to: Option<ContractAddress>,

    /// Payload of the setup delegate call (hex)
    #[arg(long = "module-data", requires = "module_to")]
    pub module_data: Option<Bytes>,

    /// Also estimate gas for the deployment
    #[arg(long = "estimate", requires = "from")]
    pub estimate: bool,

    /// Sender used for gas estimation
    #[arg(long = "from")]
    pub from: Option<ContractAddress>,

    /// Also simulate the deployment to report the resulting proxy address
    #[arg(long = "predict")]
    pub predict: bool,

    /// Network configuration
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the deploy command
    pub async fn run(&self) -> Result<()> {
        let session = self.network_args.connect().await?;
        let network = session.cache.active_network();
        let builder = DeploymentBuilder::new(session.cache.clone());

        let params = self.setup_parameters(&builder).await?;
        let salt = DeploymentSalt::new(self.salt.unwrap_or_else(default_salt));
        let call = builder.build_deployment(&params, salt).await?;
        info!(target: "safe_deployer", %network, %salt, "Deployment call ready");

        let mut output = CallOutput::new(network, &call);
        if self.predict {
            output.predicted_address = Some(builder.predict_address(&params, salt).await?);
        }
        if self.estimate {
            let from = self
                .from
                .ok_or_else(|| DeployerError::InvalidInput("--estimate requires --from".into()))?;
            let estimator = GasEstimator::new(session.cache.transport().clone());
            output.gas = Some(estimator.estimate(&call, from).await?);
        }
        print_json(&output)
    }

    async fn setup_parameters(&self, builder: &DeploymentBuilder) -> Result<SetupParameters> {
        let mut params = builder.default_setup(self.owners.clone(), self.threshold).await?;
        if let Some(handler) = self.fallback_handler {
            params.fallback_handler = handler;
        }
        if let (Some(to), Some(data)) = (self.module_to, &self.module_data) {
            params = params.with_module(to, data.clone());
        }
        Ok(params)
    }
}

fn default_salt() -> U256 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
    U256::from(millis)
}
