use std::str::FromStr;

use alloy_primitives::U256;
use clap::Parser;
use safe_proxy::{AllowanceParameters, ContractAddress, DeploymentBuilder};

use crate::common::{print_json, CallOutput, DeployerError, LogArgs, NetworkArgs, Result};

/// One `--allowance DELEGATE:TOKEN:AMOUNT[:RESET_MINUTES]` argument.
///
/// `TOKEN` is `native` or a token address; `AMOUNT` is in the token's base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceArg(pub AllowanceParameters);

impl FromStr for AllowanceArg {
    type Err = DeployerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| DeployerError::InvalidInput(format!("allowance '{s}': {reason}"));

        let parts: Vec<&str> = s.split(':').collect();
        let [delegate, token, amount, rest @ ..] = parts.as_slice() else {
            return Err(invalid("expected DELEGATE:TOKEN:AMOUNT[:RESET_MINUTES]".to_string()));
        };
        let delegate: ContractAddress = delegate.parse().map_err(|e| invalid(format!("{e}")))?;
        let token = if token.eq_ignore_ascii_case("native") {
            ContractAddress::ZERO
        } else {
            token.parse().map_err(|e| invalid(format!("{e}")))?
        };
        let amount: U256 = amount.parse().map_err(|e| invalid(format!("bad amount: {e}")))?;

        let mut allowance = AllowanceParameters::new(delegate, token, amount);
        match rest {
            [] => {}
            [reset] => {
                let minutes = reset.parse().map_err(|e| invalid(format!("bad reset period: {e}")))?;
                allowance = allowance.with_reset(minutes, 0);
            }
            _ => return Err(invalid("too many fields".to_string())),
        }
        Ok(Self(allowance))
    }
}

/// Build the batch enabling the spending-limit module on a wallet
///
/// The batch is delegate-called by the wallet as part of a signed wallet transaction, so it is
/// printed for the signer and not estimated on its own.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Existing wallet address
    #[arg(long = "wallet")]
    pub wallet: ContractAddress,

    /// Allowance to grant, as `DELEGATE:TOKEN:AMOUNT[:RESET_MINUTES]`. Repeatable.
    #[arg(long = "allowance")]
    pub allowances: Vec<AllowanceArg>,

    /// Network configuration
    #[command(flatten)]
    pub network_args: NetworkArgs,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cmd {
    /// Execute the spending-limit command
    pub async fn run(&self) -> Result<()> {
        let session = self.network_args.connect().await?;
        let network = session.cache.active_network();
        let allowances: Vec<_> = self.allowances.iter().map(|arg| arg.0.clone()).collect();

        let builder = DeploymentBuilder::new(session.cache.clone());
        let batch = builder.build_spending_limit_batch(self.wallet, &allowances).await?;

        print_json(&CallOutput::new(network, &batch))
    }
}
