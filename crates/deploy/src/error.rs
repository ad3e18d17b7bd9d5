//! Error taxonomy for a deployment run.
//!
//! Every variant is fatal to the run. Internal helpers build `anyhow` chains
//! with context; those chains are folded into a tagged variant at the
//! boundary of each operation so the operator still sees the full
//! diagnostic from the node.

use std::{path::PathBuf, time::Duration};

use alloy_core::primitives::B256;

/// Errors surfaced by the deployment orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The run configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No usable account is configured for the target network.
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// The deployment request was malformed and never left this process.
    #[error("failed to submit deployment of {contract}: {reason}")]
    DeploymentSubmission { contract: String, reason: String },

    /// The network refused, reverted or dropped the deployment.
    #[error("deployment of {contract} rejected: {reason}")]
    DeploymentRejected { contract: String, reason: String },

    /// The deployment transaction was not confirmed in time.
    #[error("deployment of {contract} (tx {tx_hash}) not confirmed after {timeout:?}")]
    ConfirmationTimeout {
        contract: String,
        tx_hash: B256,
        timeout: Duration,
    },

    /// An output file could not be written.
    #[error("failed to persist {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },
}

impl DeployError {
    pub(crate) fn submission(contract: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DeploymentSubmission {
            contract: contract.into(),
            reason: format!("{err:#}"),
        }
    }

    pub(crate) fn rejected(contract: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DeploymentRejected {
            contract: contract.into(),
            reason: format!("{err:#}"),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_context_chain() {
        let err = anyhow::anyhow!("insufficient funds for gas * price + value")
            .context("eth_sendRawTransaction failed");
        let err = DeployError::rejected("CarbonToken", err);

        let message = err.to_string();
        assert!(message.contains("CarbonToken"));
        assert!(message.contains("eth_sendRawTransaction failed"));
        assert!(message.contains("insufficient funds"));
    }

    #[test]
    fn test_persistence_mentions_path() {
        let err = DeployError::persistence("/missing/dir/myToken.json", "No such file or directory");
        assert!(err.to_string().contains("/missing/dir/myToken.json"));
    }
}
