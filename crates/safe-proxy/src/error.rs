//! Error taxonomy of the deployment layer.

use crate::{ContractRole, NetworkId};

/// Errors surfaced by the deployment layer.
///
/// The type is `Clone` so that every waiter of a coalesced resolution observes the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// Caller-supplied data violates an invariant. Never retried.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The registry has no entry for the network (or for the role on that network).
    #[error("Network {network} is not supported{}", role.map(|r| format!(" for {r}")).unwrap_or_default())]
    UnsupportedNetwork {
        /// Requested network.
        network: NetworkId,
        /// Missing role, `None` when the whole network is absent.
        role: Option<ContractRole>,
    },

    /// A handle was requested for a network that is not the active one.
    #[error("Network {requested} is not active (active network is {active})")]
    InactiveNetwork {
        /// Requested network.
        requested: NetworkId,
        /// Network the cache is bound to.
        active: NetworkId,
    },

    /// The transport is connected to a different network than the one requested.
    #[error("Transport is connected to {actual}, expected {expected}")]
    NetworkMismatch {
        /// Network the handle was requested for.
        expected: NetworkId,
        /// Network reported by the transport.
        actual: NetworkId,
    },

    /// The network collaborator failed or timed out.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The simulated call would fail on-chain. Carries the network's message unmodified.
    #[error("Gas estimation failed: {0}")]
    EstimationFailed(String),

    /// The caller abandoned the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Coarse classification of [`ProxyError`], used by collaborators to pick copy and retry
/// affordances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input must be fixed by the caller.
    InvalidParameters,
    /// Configuration gap.
    UnsupportedNetwork,
    /// External failure, safe to retry with backoff.
    Transient,
    /// The operation would revert on-chain.
    EstimationFailed,
    /// The caller cancelled.
    Cancelled,
}

impl ProxyError {
    /// Shorthand for [`ProxyError::InvalidParameters`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameters(reason.into())
    }

    /// Classifies the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameters(_) | Self::InactiveNetwork { .. } => ErrorKind::InvalidParameters,
            Self::UnsupportedNetwork { .. } => ErrorKind::UnsupportedNetwork,
            Self::NetworkMismatch { .. } | Self::NetworkUnavailable(_) => ErrorKind::Transient,
            Self::EstimationFailed(_) => ErrorKind::EstimationFailed,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether re-invoking the operation may succeed without changing its inputs.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }
}

/// Failure reported by a [`NetworkTransport`](crate::NetworkTransport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection failure, timeout or malformed response.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    /// The node answered with an error, e.g. the simulated call reverted.
    #[error("{0}")]
    Rejected(String),
}

impl From<TransportError> for ProxyError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unavailable(msg) | TransportError::Rejected(msg) => {
                Self::NetworkUnavailable(msg)
            }
        }
    }
}

/// Failure reported by an [`Indexer`](crate::Indexer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexerError {
    /// Network failure or timeout.
    #[error("indexer unavailable: {0}")]
    Transient(String),
    /// The indexer answered with a record this layer cannot interpret.
    #[error("malformed indexer response: {0}")]
    Malformed(String),
}

/// Result alias for the deployment layer.
pub type Result<T, E = ProxyError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ProxyError::NetworkUnavailable("timeout".into()).is_retryable());
        assert!(ProxyError::NetworkMismatch {
            expected: NetworkId::Fantom,
            actual: NetworkId::FantomTestnet
        }
        .is_retryable());
        assert!(!ProxyError::invalid("no owners").is_retryable());
        assert!(!ProxyError::EstimationFailed("execution reverted".into()).is_retryable());
        assert!(!ProxyError::InactiveNetwork {
            requested: NetworkId::Fantom,
            active: NetworkId::Mainnet
        }
        .is_retryable());
    }

    #[test]
    fn test_unsupported_network_message() {
        let whole = ProxyError::UnsupportedNetwork { network: NetworkId::Custom(7), role: None };
        assert_eq!(whole.to_string(), "Network 7 is not supported");

        let role = ProxyError::UnsupportedNetwork {
            network: NetworkId::Fantom,
            role: Some(ContractRole::SpendingLimitModule),
        };
        assert_eq!(role.to_string(), "Network fantom is not supported for spending_limit_module");
    }
}
