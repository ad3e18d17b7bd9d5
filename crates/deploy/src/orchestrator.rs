//! The token-then-marketplace deployment sequence.

use std::path::PathBuf;

use alloy_core::{dyn_abi::DynSolValue, primitives::U256};
use alloy_signer_local::PrivateKeySigner;

use crate::{
    ContractDeployer, ContractDescriptor, DeployError, DeployedContract, OutputConfig,
    artifact::{extract_artifact, persist_artifact},
    journal::{DeploymentConfigHash, DeploymentJournal},
};

/// What a run deploys and where it writes the results.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub token: ContractDescriptor,
    /// Token constructor argument, in base units.
    pub initial_supply: U256,
    /// Deployed with the token address as its only constructor argument.
    pub marketplace: ContractDescriptor,
    pub output: OutputConfig,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub token: DeployedContract,
    pub marketplace: DeployedContract,
    pub token_artifact: PathBuf,
    pub marketplace_artifact: PathBuf,
    /// Present when journaling is enabled.
    pub journal: Option<PathBuf>,
}

/// Runs a [`DeploymentPlan`] against a [`ContractDeployer`].
///
/// The marketplace constructor needs the token address, so the two
/// deployments are strictly sequential. Any error aborts the run; contracts
/// already confirmed stay deployed and are listed in the journal.
pub struct Orchestrator<D> {
    deployer: D,
    plan: DeploymentPlan,
}

impl<D: ContractDeployer> Orchestrator<D> {
    pub fn new(deployer: D, plan: DeploymentPlan) -> Self {
        Self { deployer, plan }
    }

    pub fn deployer(&self) -> &D {
        &self.deployer
    }

    pub async fn run(&self, signer: &PrivateKeySigner) -> Result<DeploymentOutcome, DeployError> {
        let plan = &self.plan;
        let mut journal = JournalWriter::new(&self.deployer, plan);

        tracing::info!(
            contract = %plan.token.name,
            initial_supply = %plan.initial_supply,
            "Deploying token contract..."
        );
        let token_handle = self
            .deployer
            .deploy_contract(
                &plan.token,
                signer,
                vec![DynSolValue::Uint(plan.initial_supply, 256)],
            )
            .await?;
        let token = self.deployer.await_confirmation(token_handle).await?;
        journal.record(&token)?;

        tracing::info!(
            contract = %plan.marketplace.name,
            token_address = %token.address,
            "Deploying marketplace contract..."
        );
        let marketplace_handle = self
            .deployer
            .deploy_contract(
                &plan.marketplace,
                signer,
                vec![DynSolValue::Address(token.address)],
            )
            .await?;
        let marketplace = self.deployer.await_confirmation(marketplace_handle).await?;
        journal.record(&marketplace)?;

        let marketplace_artifact = plan.output.marketplace_artifact_path();
        persist_artifact(&extract_artifact(&marketplace), &marketplace_artifact)?;

        let token_artifact = plan.output.token_artifact_path();
        persist_artifact(&extract_artifact(&token), &token_artifact)?;

        tracing::info!(
            token = %token.address,
            marketplace = %marketplace.address,
            "✓ Deployment complete!"
        );

        Ok(DeploymentOutcome {
            token,
            marketplace,
            token_artifact,
            marketplace_artifact,
            journal: journal.path,
        })
    }
}

/// Keeps the on-disk journal in sync with confirmed deployments.
struct JournalWriter {
    path: Option<PathBuf>,
    journal: DeploymentJournal,
}

impl JournalWriter {
    fn new<D: ContractDeployer>(deployer: &D, plan: &DeploymentPlan) -> Self {
        let chain_id = deployer.chain_id();
        let config = DeploymentConfigHash::new(
            chain_id,
            &plan.token,
            plan.initial_supply,
            &plan.marketplace,
        );

        Self {
            path: plan
                .output
                .journal_dir
                .as_deref()
                .map(|dir| DeploymentJournal::path_in(dir, chain_id)),
            journal: DeploymentJournal::new(&config),
        }
    }

    fn record(&mut self, deployed: &DeployedContract) -> Result<(), DeployError> {
        self.journal.record(deployed);

        let Some(path) = &self.path else {
            return Ok(());
        };

        self.journal
            .save_to_file(path)
            .map_err(|e| DeployError::persistence(path, e))?;
        tracing::debug!(path = %path.display(), contract = %deployed.contract, "Journal updated");

        Ok(())
    }
}
