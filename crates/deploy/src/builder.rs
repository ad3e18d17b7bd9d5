//! Builder module for creating a [`Deployer`] configuration.
//!
//! This module provides the [`DeployerBuilder`] struct which layers explicit
//! overrides (typically from the command line) on top of a base configuration
//! and resolves named networks to RPC endpoints.

use std::path::PathBuf;

use crate::{DeployError, Deployer};

/// Well-known networks that can be targeted by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum KnownNetwork {
    /// Ethereum Sepolia through Infura.
    Sepolia,
    /// A local Hardhat or Anvil node.
    Localhost,
}

impl KnownNetwork {
    pub fn chain_id(&self) -> u64 {
        match self {
            KnownNetwork::Sepolia => 11155111,
            KnownNetwork::Localhost => 31337,
        }
    }

    /// The RPC endpoint of this network.
    pub fn rpc_url(&self, infura_project_id: Option<&str>) -> Result<String, DeployError> {
        match self {
            KnownNetwork::Sepolia => match infura_project_id.filter(|id| !id.is_empty()) {
                Some(project_id) => Ok(format!("https://sepolia.infura.io/v3/{project_id}")),
                None => Err(DeployError::Config(
                    "the sepolia network requires an Infura project ID".into(),
                )),
            },
            KnownNetwork::Localhost => Ok("http://127.0.0.1:8545".to_string()),
        }
    }
}

/// Builder for creating a [`Deployer`] configuration.
///
/// Every setter overrides the matching field of the base configuration; unset
/// fields keep their base value.
///
/// # Example
///
/// ```no_run
/// use carbonmart_deploy::{DeployerBuilder, KnownNetwork};
///
/// # fn example() -> Result<(), carbonmart_deploy::DeployError> {
/// let deployer = DeployerBuilder::default()
///     .network(KnownNetwork::Sepolia)
///     .infura_project_id("my-project-id")
///     .signer_key("0x...")
///     .frontend_dir("nft-marketplace/src")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeployerBuilder {
    /// The configuration the overrides apply to.
    base: Deployer,
    /// A named network (optional).
    network: Option<KnownNetwork>,
    /// Infura project ID used by named networks.
    infura_project_id: Option<String>,
    /// An explicit RPC URL, taking precedence over the named network.
    network_url: Option<String>,
    signer_key: Option<String>,
    artifacts_dir: Option<PathBuf>,
    frontend_dir: Option<PathBuf>,
    journal_dir: Option<PathBuf>,
    no_journal: bool,
    confirmation_timeout_secs: Option<u64>,
}

impl DeployerBuilder {
    /// Create a builder on top of an existing configuration.
    pub fn from_config(base: Deployer) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    /// Target a well-known network.
    pub fn network(mut self, network: KnownNetwork) -> Self {
        self.network = Some(network);
        self
    }

    pub fn infura_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.infura_project_id = Some(project_id.into());
        self
    }

    /// Set the RPC URL of the target network.
    pub fn network_url(mut self, url: impl Into<String>) -> Self {
        self.network_url = Some(url.into());
        self
    }

    /// Set the private key of the deploying account.
    pub fn signer_key(mut self, key: impl Into<String>) -> Self {
        self.signer_key = Some(key.into());
        self
    }

    /// Set the Hardhat artifacts directory.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the frontend directory receiving the artifact files.
    pub fn frontend_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.frontend_dir = Some(path.into());
        self
    }

    /// Set the directory receiving deployment journals.
    pub fn journal_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_dir = Some(path.into());
        self
    }

    /// Disable the deployment journal.
    pub fn no_journal(mut self, no_journal: bool) -> Self {
        self.no_journal = no_journal;
        self
    }

    pub fn confirmation_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.confirmation_timeout_secs = Some(timeout_secs);
        self
    }

    /// Build the [`Deployer`] configuration.
    ///
    /// The RPC URL is taken from, in order: the explicit URL, the named
    /// network, the base configuration.
    pub fn build(self) -> Result<Deployer, DeployError> {
        let mut deployer = self.base;

        if let Some(url) = self.network_url {
            deployer.network.network_url = Some(url);
        } else if let Some(network) = self.network {
            deployer.network.network_url =
                Some(network.rpc_url(self.infura_project_id.as_deref())?);
        }

        if let Some(network) = self.network {
            match deployer.network.chain_id {
                Some(chain_id) if chain_id != network.chain_id() => {
                    return Err(DeployError::Config(format!(
                        "network {network} has chain ID {}, configuration pins {chain_id}",
                        network.chain_id()
                    )));
                }
                _ => deployer.network.chain_id = Some(network.chain_id()),
            }
        }

        if let Some(key) = self.signer_key {
            deployer.network.signer_key = Some(key);
        }
        if let Some(path) = self.artifacts_dir {
            deployer.contracts.artifacts_dir = path;
        }
        if let Some(path) = self.frontend_dir {
            deployer.output.frontend_dir = path;
        }
        if let Some(path) = self.journal_dir {
            deployer.output.journal_dir = Some(path);
        }
        if self.no_journal {
            deployer.output.journal_dir = None;
        }
        if let Some(timeout_secs) = self.confirmation_timeout_secs {
            deployer.confirmation.timeout_secs = timeout_secs;
        }

        tracing::debug!(
            network_url = ?deployer.network.network_url,
            chain_id = ?deployer.network.chain_id,
            frontend_dir = %deployer.output.frontend_dir.display(),
            "Built deployer configuration"
        );

        Ok(deployer)
    }
}
