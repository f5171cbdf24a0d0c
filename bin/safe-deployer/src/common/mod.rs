mod config;
mod error;
mod indexer;
mod logging;
mod network;
mod output;
mod rpc;

pub use config::*;
pub use error::*;
pub use indexer::*;
pub use logging::*;
pub use network::*;
pub use output::*;
pub use rpc::*;
