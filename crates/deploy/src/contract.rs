//! Deployable contract descriptors loaded from Hardhat compilation output.

use std::path::{Path, PathBuf};

use alloy_core::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::DeployError;

/// Subset of a Hardhat artifact (`hh-sol-artifact-1`) needed for deployment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: JsonAbi,
    bytecode: Bytes,
    #[serde(default)]
    link_references: Map<String, Value>,
}

/// A contract that can be deployed: its name, interface and creation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>, abi: JsonAbi, bytecode: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            abi,
            bytecode: bytecode.into(),
        }
    }

    /// Path of the Hardhat artifact for `name` under `artifacts_dir`.
    ///
    /// Hardhat lays artifacts out as `contracts/<Name>.sol/<Name>.json`.
    pub fn artifact_path(artifacts_dir: &Path, name: &str) -> PathBuf {
        artifacts_dir
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    /// Load the descriptor of `name` from a Hardhat artifacts directory.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, DeployError> {
        let path = Self::artifact_path(artifacts_dir, name);
        let descriptor =
            Self::from_hardhat_artifact(&path).map_err(|e| DeployError::submission(name, e))?;

        if descriptor.name != name {
            return Err(DeployError::submission(
                name,
                format!(
                    "artifact {} describes contract {}",
                    path.display(),
                    descriptor.name
                ),
            ));
        }

        Ok(descriptor)
    }

    /// Parse a single Hardhat artifact file.
    pub fn from_hardhat_artifact(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contract artifact {}", path.display()))?;
        let artifact: HardhatArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse contract artifact {}", path.display()))?;

        if !artifact.link_references.is_empty() {
            anyhow::bail!(
                "Contract {} requires library linking ({}), which is not supported",
                artifact.contract_name,
                artifact
                    .link_references
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        tracing::debug!(
            contract = %artifact.contract_name,
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "Loaded contract artifact"
        );

        Ok(Self::new(artifact.contract_name, artifact.abi, artifact.bytecode))
    }

    /// Build the creation payload: bytecode followed by the ABI-encoded
    /// constructor arguments.
    pub fn encode_deploy_data(&self, constructor_args: &[DynSolValue]) -> Result<Bytes, DeployError> {
        if self.bytecode.is_empty() {
            return Err(DeployError::submission(
                &self.name,
                "no creation bytecode (abstract contract or interface?)",
            ));
        }

        let encoded_args = match &self.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(constructor_args)
                .map_err(|e| DeployError::submission(&self.name, e))?,
            None if constructor_args.is_empty() => Vec::new(),
            None => {
                return Err(DeployError::submission(
                    &self.name,
                    format!(
                        "contract has no constructor but {} argument(s) were given",
                        constructor_args.len()
                    ),
                ));
            }
        };

        let mut data = Vec::with_capacity(self.bytecode.len() + encoded_args.len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(&encoded_args);
        Ok(data.into())
    }
}
