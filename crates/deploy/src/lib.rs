//! carbonmart-deploy - Deployment library for the carbon token marketplace.
//!
//! This crate deploys the token contract, then the marketplace contract
//! bound to the token's address, and hands both `{address, abi}` artifacts
//! over to the frontend project.

mod artifact;
pub use artifact::{ArtifactFile, extract_artifact, persist_artifact};

mod builder;
pub use builder::{DeployerBuilder, KnownNetwork};

mod config;
pub use config::{
    ConfirmationConfig, ContractsConfig, MarketplaceConfig, NetworkConfig, OutputConfig,
    TokenConfig,
};

mod contract;
pub use contract::ContractDescriptor;

mod deployer;
pub use deployer::{CONFIG_FILENAME, Deployer, ENV_PREFIX};

mod deployment;
pub use deployment::{ContractDeployer, DeployedContract, DeploymentHandle};

mod error;
pub use error::DeployError;

mod fs;

pub mod journal;

mod orchestrator;
pub use orchestrator::{DeploymentOutcome, DeploymentPlan, Orchestrator};

mod rpc;
pub mod services;
pub use services::RpcDeployer;

mod signer;
pub use signer::resolve_signer;
