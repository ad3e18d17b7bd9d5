//! Artifact files handed to the frontend.
//!
//! An artifact is the JSON document `{ "address": ..., "abi": ... }` where
//! `abi` is the contract's JSON ABI serialized to a string. Artifacts are
//! rewritten wholesale on every run.

use std::path::Path;

use alloy_core::json_abi::JsonAbi;
use serde::{Deserialize, Serialize};

use crate::{DeployError, DeployedContract, fs::FsHandler};

/// The persisted `{address, abi}` pair of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// EIP-55 checksummed contract address.
    pub address: String,
    /// JSON ABI, serialized.
    pub abi: String,
}

impl ArtifactFile {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("ArtifactFile serialization should never fail")
    }

    /// Parse the embedded ABI back into a structured interface.
    pub fn parse_abi(&self) -> serde_json::Result<JsonAbi> {
        serde_json::from_str(&self.abi)
    }
}

/// Build the artifact of a confirmed deployment.
pub fn extract_artifact(record: &DeployedContract) -> ArtifactFile {
    ArtifactFile {
        address: record.address.to_checksum(None),
        abi: serde_json::to_string(&record.abi).expect("JsonAbi serialization should never fail"),
    }
}

/// Write `artifact` to `destination`, replacing any previous file.
///
/// The destination directory must already exist; it belongs to the frontend
/// project.
pub fn persist_artifact(artifact: &ArtifactFile, destination: &Path) -> Result<(), DeployError> {
    FsHandler::write_atomic(destination, artifact.to_json().as_bytes())
        .map_err(|e| DeployError::persistence(destination, e))?;

    tracing::info!(
        path = %destination.display(),
        address = %artifact.address,
        "Artifact written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::{B256, address};
    use tempdir::TempDir;

    use super::*;

    fn token_record() -> DeployedContract {
        DeployedContract {
            contract: "CarbonToken".to_string(),
            address: address!("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
            abi: JsonAbi::parse([
                "function transfer(address to, uint256 value) returns (bool)",
                "event Transfer(address indexed from, address indexed to, uint256 value)",
            ])
            .unwrap(),
            tx_hash: B256::repeat_byte(0x11),
            block_number: 1,
            constructor_args: Vec::new(),
        }
    }

    #[test]
    fn test_extract_artifact() {
        let record = token_record();
        let artifact = extract_artifact(&record);

        assert_eq!(artifact.address, "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        let abi = artifact.parse_abi().unwrap();
        assert_eq!(abi, record.abi);
        assert!(abi.function("transfer").is_some());
        assert!(abi.event("Transfer").is_some());
    }

    #[test]
    fn test_artifact_layout() {
        let artifact = extract_artifact(&token_record());
        let json = artifact.to_json();

        assert!(json.starts_with("{\n  \"address\": \"0x5FbDB"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object["abi"].is_string());
    }

    #[test]
    fn test_persist_is_byte_identical_across_runs() {
        let dir = TempDir::new("carbonmart-test").unwrap();
        let path = dir.path().join("myToken.json");
        let artifact = extract_artifact(&token_record());

        persist_artifact(&artifact, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        persist_artifact(&artifact, &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_persist_into_missing_directory() {
        let dir = TempDir::new("carbonmart-test").unwrap();
        let path = dir.path().join("nft-marketplace/src/myToken.json");

        let err = persist_artifact(&extract_artifact(&token_record()), &path).unwrap_err();
        assert!(matches!(err, DeployError::Persistence { .. }));
        assert!(!path.exists());
    }
}
