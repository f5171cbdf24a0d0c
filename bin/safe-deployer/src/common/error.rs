use safe_proxy::{NetworkId, ProxyError};

/// Error types of the safe-deployer commands
#[derive(Debug, thiserror::Error)]
pub enum DeployerError {
    /// Error surfaced by the deployment layer
    #[error("{0}")]
    Proxy(#[from] ProxyError),

    /// No endpoint of the given kind is configured for the network
    #[error("No {kind} endpoint configured for network {network}; pass --{kind} or add it to the config file")]
    MissingEndpoint {
        /// Network lacking the endpoint
        network: NetworkId,
        /// `rpc` or `indexer`
        kind: &'static str,
    },

    /// Invalid configuration file
    #[error("Invalid config: {0}")]
    Config(String),

    /// Invalid command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to (de)serialize JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the safe-deployer commands
pub type Result<T> = std::result::Result<T, DeployerError>;
