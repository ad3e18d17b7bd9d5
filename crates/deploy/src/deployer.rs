use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{
    ConfirmationConfig, ContractDescriptor, ContractsConfig, DeployError, DeploymentOutcome,
    DeploymentPlan, NetworkConfig, Orchestrator, OutputConfig, RpcDeployer, resolve_signer,
};

/// The default name for the carbonmart configuration file.
pub const CONFIG_FILENAME: &str = "Carbonmart.toml";

/// Prefix of environment variables overriding the configuration.
///
/// Nested keys are separated by a double underscore, e.g.
/// `CARBONMART_NETWORK__SIGNER_KEY`.
pub const ENV_PREFIX: &str = "CARBONMART_";

/// Main deployer that deploys the token and marketplace contracts.
///
/// This struct contains all the configuration needed for a run and can be
/// serialized to/from TOML format. The signer key is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployer {
    /// Target network and credentials.
    pub network: NetworkConfig,
    /// Contracts to deploy and where their compiled artifacts live.
    pub contracts: ContractsConfig,
    /// Artifact destinations.
    pub output: OutputConfig,
    /// Submission and confirmation parameters.
    pub confirmation: ConfirmationConfig,
}

impl Deployer {
    /// Load the configuration: defaults, then `path` (if any), then
    /// `CARBONMART_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, DeployError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            let config_path = if path.is_dir() {
                path.join(CONFIG_FILENAME)
            } else {
                path.to_path_buf()
            };

            if !config_path.exists() {
                return Err(DeployError::Config(format!(
                    "configuration file not found: {}",
                    config_path.display()
                )));
            }

            figment = figment.merge(Toml::file(&config_path));
            tracing::debug!(path = %config_path.display(), "Loading configuration file");
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployer config to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file only.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load the compiled contracts and build the plan of this run.
    pub fn plan(&self) -> Result<DeploymentPlan, DeployError> {
        let initial_supply = self.contracts.token.initial_supply_units()?;

        if self.confirmation.timeout_secs == 0 {
            return Err(DeployError::Config(
                "confirmation timeout must be at least one second".into(),
            ));
        }

        let artifacts_dir = &self.contracts.artifacts_dir;
        let token = ContractDescriptor::load(artifacts_dir, &self.contracts.token.name)?;
        let marketplace =
            ContractDescriptor::load(artifacts_dir, &self.contracts.marketplace.name)?;

        // Artifacts are only written once both contracts are confirmed.
        let frontend_dir = &self.output.frontend_dir;
        if !frontend_dir.is_dir() {
            return Err(DeployError::persistence(
                frontend_dir,
                "frontend directory does not exist",
            ));
        }

        Ok(DeploymentPlan {
            token,
            initial_supply,
            marketplace,
            output: self.output.clone(),
        })
    }

    /// Deploy the token, then the marketplace, and write both artifacts.
    pub async fn deploy(&self) -> Result<DeploymentOutcome, DeployError> {
        tracing::info!("Starting deployment process...");

        let signer = resolve_signer(&self.network)?;
        let plan = self.plan()?;
        let deployer = RpcDeployer::connect(&self.network, self.confirmation.clone()).await?;

        Orchestrator::new(deployer, plan).run(&signer).await
    }
}
