//! Contract deployment over Ethereum JSON-RPC.
//!
//! Transactions are signed locally and sent with `eth_sendRawTransaction`, so
//! any endpoint works, including hosted ones that hold no accounts.

mod tx;

use alloy_core::{
    dyn_abi::DynSolValue,
    primitives::{Address, B256, Bytes, U64, U128},
};
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

pub use tx::{Fees, creation_transaction, gas_limit_with_margin, sign_transaction};

use crate::{
    ConfirmationConfig, ContractDeployer, ContractDescriptor, DeployError, DeployedContract,
    DeploymentHandle, NetworkConfig, rpc,
};

/// Consecutive polls for which the node must not know a transaction before
/// it is considered dropped. Load-balanced endpoints may lag behind the node
/// that accepted it.
const DROPPED_AFTER_POLLS: u32 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockFees {
    #[serde(default)]
    base_fee_per_gas: Option<U128>,
}

/// Fields of `eth_getTransactionReceipt` used to confirm a deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    contract_address: Option<Address>,
    /// Absent on pre-Byzantium chains.
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl TransactionReceipt {
    fn reverted(&self) -> bool {
        self.status.is_some_and(|status| status.is_zero())
    }
}

/// [`ContractDeployer`] backed by a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcDeployer {
    client: reqwest::Client,
    url: String,
    chain_id: u64,
    confirmation: ConfirmationConfig,
}

impl RpcDeployer {
    /// Connect to the network's endpoint and resolve its chain ID.
    ///
    /// When the configuration pins a chain ID, the endpoint must report the same one.
    pub async fn connect(
        network: &NetworkConfig,
        confirmation: ConfirmationConfig,
    ) -> Result<Self, DeployError> {
        let url = network
            .network_url
            .clone()
            .ok_or_else(|| DeployError::SignerUnavailable("no network URL configured".into()))?;

        let client = rpc::create_client().map_err(|e| DeployError::Config(format!("{e:#}")))?;

        let chain_id: U64 = rpc::json_rpc_call(&client, &url, "eth_chainId", vec![])
            .await
            .map_err(|e| {
                DeployError::SignerUnavailable(format!("cannot reach network at {url}: {e:#}"))
            })?;
        let chain_id = chain_id.to::<u64>();

        if let Some(expected) = network.chain_id.filter(|expected| *expected != chain_id) {
            return Err(DeployError::Config(format!(
                "network at {url} reports chain ID {chain_id}, expected {expected}"
            )));
        }

        tracing::info!(chain_id, network_url = %url, "Connected to network");

        Ok(Self {
            client,
            url,
            chain_id,
            confirmation,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> anyhow::Result<T> {
        rpc::json_rpc_call(&self.client, &self.url, method, params).await
    }

    async fn fees(&self) -> anyhow::Result<Fees> {
        let block: BlockFees = self
            .call("eth_getBlockByNumber", vec![json!("latest"), json!(false)])
            .await?;

        match block.base_fee_per_gas {
            Some(base_fee) => {
                let priority_fee: U128 = self.call("eth_maxPriorityFeePerGas", vec![]).await?;
                Ok(Fees::from_base_fee(base_fee.to(), priority_fee.to()))
            }
            None => {
                let gas_price: U128 = self.call("eth_gasPrice", vec![]).await?;
                Ok(Fees::from_gas_price(gas_price.to()))
            }
        }
    }

    /// Poll until the transaction is included, then until it has the
    /// configured number of confirmations.
    async fn wait_for_receipt(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<TransactionReceipt, DeployError> {
        let poll_interval = self.confirmation.poll_interval();
        let mut unknown_polls = 0;

        let (receipt, block_number) = loop {
            match self
                .call::<Option<TransactionReceipt>>(
                    "eth_getTransactionReceipt",
                    vec![json!(handle.tx_hash)],
                )
                .await
            {
                Ok(Some(receipt)) if receipt.block_number.is_some() => {
                    let block_number = receipt.block_number.unwrap_or_default().to::<u64>();
                    break (receipt, block_number);
                }
                Ok(_) => {
                    if self.is_known(handle.tx_hash).await {
                        unknown_polls = 0;
                    } else {
                        unknown_polls += 1;
                        if unknown_polls >= DROPPED_AFTER_POLLS {
                            return Err(DeployError::rejected(
                                &handle.contract,
                                format!("transaction {} was dropped by the network", handle.tx_hash),
                            ));
                        }
                    }
                    tracing::trace!(contract = %handle.contract, tx_hash = %handle.tx_hash, "Deployment pending");
                }
                Err(e) => {
                    tracing::trace!(error = %e, contract = %handle.contract, "Receipt poll failed, retrying...");
                }
            }

            tokio::time::sleep(poll_interval).await;
        };

        if self.confirmation.confirmations > 1 && !receipt.reverted() {
            let target_block = block_number + self.confirmation.confirmations - 1;
            while self.latest_block().await < target_block {
                tracing::trace!(block_number, target_block, "Waiting for confirmations");
                tokio::time::sleep(poll_interval).await;
            }
        }

        Ok(receipt)
    }

    /// Whether the node knows the transaction. Lookup failures count as known.
    async fn is_known(&self, tx_hash: B256) -> bool {
        match self
            .call::<Option<Value>>("eth_getTransactionByHash", vec![json!(tx_hash)])
            .await
        {
            Ok(tx) => tx.is_some(),
            Err(e) => {
                tracing::trace!(error = %e, %tx_hash, "Transaction lookup failed");
                true
            }
        }
    }

    /// Latest block number, or zero when the node can't be reached.
    async fn latest_block(&self) -> u64 {
        match self.call::<U64>("eth_blockNumber", vec![]).await {
            Ok(number) => number.to(),
            Err(e) => {
                tracing::trace!(error = %e, "Block number poll failed");
                0
            }
        }
    }
}

impl ContractDeployer for RpcDeployer {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn deploy_contract(
        &self,
        descriptor: &ContractDescriptor,
        signer: &PrivateKeySigner,
        constructor_args: Vec<DynSolValue>,
    ) -> Result<DeploymentHandle, DeployError> {
        let contract = descriptor.name.as_str();
        let input = descriptor.encode_deploy_data(&constructor_args)?;
        let from = signer.address();

        let nonce: U64 = self
            .call("eth_getTransactionCount", vec![json!(from), json!("pending")])
            .await
            .map_err(|e| DeployError::rejected(contract, e))?;
        let nonce = nonce.to::<u64>();

        let estimate: U64 = self
            .call(
                "eth_estimateGas",
                vec![json!({ "from": from, "data": input })],
            )
            .await
            .map_err(|e| DeployError::rejected(contract, e))?;
        let gas_limit =
            gas_limit_with_margin(estimate.to(), self.confirmation.gas_limit_margin_percent);

        let fees = self
            .fees()
            .await
            .map_err(|e| DeployError::rejected(contract, e))?;

        let tx = creation_transaction(self.chain_id, nonce, gas_limit, fees, input);
        let (tx_hash, raw_tx) =
            sign_transaction(tx, signer).map_err(|e| DeployError::submission(contract, e))?;

        tracing::debug!(
            contract,
            nonce,
            gas_limit,
            ?fees,
            "Sending creation transaction"
        );

        let accepted_hash: B256 = self
            .call("eth_sendRawTransaction", vec![json!(raw_tx)])
            .await
            .map_err(|e| DeployError::rejected(contract, e))?;

        if accepted_hash != tx_hash {
            tracing::warn!(%tx_hash, %accepted_hash, "Node returned an unexpected transaction hash");
        }

        let expected_address = from.create(nonce);
        tracing::info!(contract, %tx_hash, %expected_address, "Deployment submitted");

        Ok(DeploymentHandle {
            contract: descriptor.name.clone(),
            abi: descriptor.abi.clone(),
            tx_hash,
            deployer: from,
            nonce,
            expected_address,
            constructor_args,
        })
    }

    async fn await_confirmation(
        &self,
        handle: DeploymentHandle,
    ) -> Result<DeployedContract, DeployError> {
        let timeout = self.confirmation.timeout();

        tracing::info!(contract = %handle.contract, tx_hash = %handle.tx_hash, "Waiting for confirmation...");

        let receipt = tokio::time::timeout(timeout, self.wait_for_receipt(&handle))
            .await
            .map_err(|_| DeployError::ConfirmationTimeout {
                contract: handle.contract.clone(),
                tx_hash: handle.tx_hash,
                timeout,
            })??;

        let block_number = receipt.block_number.unwrap_or_default().to::<u64>();

        if receipt.reverted() {
            return Err(DeployError::rejected(
                &handle.contract,
                format!(
                    "transaction {} reverted in block {} (gas used: {})",
                    handle.tx_hash,
                    block_number,
                    receipt.gas_used.unwrap_or_default()
                ),
            ));
        }

        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::rejected(
                &handle.contract,
                format!("receipt of {} has no contract address", handle.tx_hash),
            )
        })?;

        let code: Bytes = self
            .call("eth_getCode", vec![json!(address), json!("latest")])
            .await
            .map_err(|e| DeployError::rejected(&handle.contract, e))?;
        if code.is_empty() {
            return Err(DeployError::rejected(
                &handle.contract,
                format!("no code at deployed address {address}"),
            ));
        }

        if address != handle.expected_address {
            tracing::warn!(
                contract = %handle.contract,
                %address,
                expected_address = %handle.expected_address,
                "Deployed address differs from the CREATE address"
            );
        }

        tracing::info!(
            contract = %handle.contract,
            %address,
            block_number,
            "Deployment confirmed"
        );

        Ok(handle.into_record(address, block_number))
    }
}
