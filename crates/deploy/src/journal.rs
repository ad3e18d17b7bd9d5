use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, B256, U256, keccak256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ContractDescriptor, DeployedContract, fs::FsHandler};

/// Parameters that determine what a run puts on chain.
///
/// Two runs with the same hash deploy the same code with the same token
/// supply to the same chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfigHash {
    pub chain_id: u64,
    pub token_contract: String,
    /// Keccak-256 of the token creation bytecode.
    pub token_bytecode_hash: B256,
    /// Initial supply in base units, decimal.
    pub initial_supply: String,
    pub marketplace_contract: String,
    /// Keccak-256 of the marketplace creation bytecode.
    pub marketplace_bytecode_hash: B256,
}

impl DeploymentConfigHash {
    pub fn new(
        chain_id: u64,
        token: &ContractDescriptor,
        initial_supply: U256,
        marketplace: &ContractDescriptor,
    ) -> Self {
        Self {
            chain_id,
            token_contract: token.name.clone(),
            token_bytecode_hash: keccak256(&token.bytecode),
            initial_supply: initial_supply.to_string(),
            marketplace_contract: marketplace.name.clone(),
            marketplace_bytecode_hash: keccak256(&marketplace.bytecode),
        }
    }

    /// Compute a SHA-256 hash of this configuration.
    ///
    /// The hash is deterministic - the same configuration always produces the same hash.
    pub fn compute_hash(&self) -> String {
        let json = serde_json::to_string(self)
            .expect("DeploymentConfigHash serialization should never fail");

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A confirmed contract as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub contract: String,
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: u64,
    /// Unix timestamp of the confirmation.
    pub confirmed_at: i64,
}

/// Record of the deployments confirmed during one run.
///
/// Rewritten after every confirmation so that an aborted run still leaves a
/// trace of the contracts it already put on chain. Never used to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentJournal {
    pub config_hash: String,
    pub chain_id: u64,
    /// Unix timestamp of the start of the run.
    pub started_at: i64,
    /// Version of the tool that wrote this journal.
    pub tool_version: String,
    pub contracts: Vec<JournalEntry>,
}

impl DeploymentJournal {
    pub fn new(config: &DeploymentConfigHash) -> Self {
        Self {
            config_hash: config.compute_hash(),
            chain_id: config.chain_id,
            started_at: chrono::Utc::now().timestamp(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            contracts: Vec::new(),
        }
    }

    /// Journal location for `chain_id` inside `dir`.
    pub fn path_in(dir: &Path, chain_id: u64) -> PathBuf {
        dir.join(format!("{chain_id}.json"))
    }

    pub fn record(&mut self, deployed: &DeployedContract) {
        self.contracts.push(JournalEntry {
            contract: deployed.contract.clone(),
            address: deployed.address,
            tx_hash: deployed.tx_hash,
            block_number: deployed.block_number,
            confirmed_at: chrono::Utc::now().timestamp(),
        });
    }

    /// Save the journal as formatted JSON, creating `path`'s directory if needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            FsHandler::create_output_directory(dir)?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize deployment journal")?;
        FsHandler::write_atomic(path, json.as_bytes())
            .with_context(|| format!("Failed to write deployment journal to {}", path.display()))
    }

    /// Load a journal from a file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Deployment journal does not exist: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deployment journal from {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse deployment journal JSON")
    }
}
