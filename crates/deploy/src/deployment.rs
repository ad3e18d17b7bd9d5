//! Deployment lifecycle types and the deployment facility seam.
//!
//! A deployment starts as a [`DeploymentHandle`] once submitted and becomes a
//! [`DeployedContract`] after the network confirms it. The address of a
//! contract is only readable from the confirmed record.

use std::future::Future;

use alloy_core::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, B256},
};
use alloy_signer_local::PrivateKeySigner;

use crate::{ContractDescriptor, DeployError};

/// A submitted, not yet confirmed, deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentHandle {
    pub contract: String,
    pub abi: JsonAbi,
    pub tx_hash: B256,
    /// The account that sent the creation transaction.
    pub deployer: Address,
    pub nonce: u64,
    /// CREATE address derived from `deployer` and `nonce`.
    pub expected_address: Address,
    pub constructor_args: Vec<DynSolValue>,
}

impl DeploymentHandle {
    /// Turn the handle into its terminal record.
    pub fn into_record(self, address: Address, block_number: u64) -> DeployedContract {
        DeployedContract {
            contract: self.contract,
            address,
            abi: self.abi,
            tx_hash: self.tx_hash,
            block_number,
            constructor_args: self.constructor_args,
        }
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedContract {
    pub contract: String,
    pub address: Address,
    pub abi: JsonAbi,
    pub tx_hash: B256,
    pub block_number: u64,
    pub constructor_args: Vec<DynSolValue>,
}

/// A facility able to put contracts on chain.
pub trait ContractDeployer: Send + Sync {
    /// The chain ID deployments are sent to.
    fn chain_id(&self) -> u64;

    /// Submit the creation transaction of `descriptor`.
    fn deploy_contract(
        &self,
        descriptor: &ContractDescriptor,
        signer: &PrivateKeySigner,
        constructor_args: Vec<DynSolValue>,
    ) -> impl Future<Output = Result<DeploymentHandle, DeployError>> + Send;

    /// Wait until the network includes the deployment.
    fn await_confirmation(
        &self,
        handle: DeploymentHandle,
    ) -> impl Future<Output = Result<DeployedContract, DeployError>> + Send;
}
