//! Creation transaction building and signing.

use alloy_consensus::{
    SignableTransaction, Signed, TxEip1559, TxEnvelope, TxLegacy, TypedTransaction,
};
use alloy_core::primitives::{B256, Bytes, Signature, TxKind, U256};
use alloy_eips::eip2718::Encodable2718;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::Context;

/// Fee parameters of a creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fees {
    /// London and later: base fee plus tip.
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    /// Networks without a base fee only know a single gas price.
    Legacy { gas_price: u128 },
}

impl Fees {
    /// Leave room for the base fee to double before the transaction is priced out.
    pub fn from_base_fee(base_fee: u128, priority_fee: u128) -> Self {
        Self::Eip1559 {
            max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(priority_fee),
            max_priority_fee_per_gas: priority_fee,
        }
    }

    pub fn from_gas_price(gas_price: u128) -> Self {
        Self::Legacy { gas_price }
    }
}

/// Add `margin_percent` on top of a gas estimate.
pub fn gas_limit_with_margin(estimate: u64, margin_percent: u64) -> u64 {
    let limit = u128::from(estimate) * u128::from(100 + margin_percent) / 100;
    u64::try_from(limit).unwrap_or(u64::MAX)
}

/// Build the creation transaction for `input`.
///
/// The transaction type follows the fees: EIP-1559 when the network has a
/// base fee, EIP-155 legacy otherwise.
pub fn creation_transaction(
    chain_id: u64,
    nonce: u64,
    gas_limit: u64,
    fees: Fees,
    input: Bytes,
) -> TypedTransaction {
    match fees {
        Fees::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => TypedTransaction::Eip1559(TxEip1559 {
            chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to: TxKind::Create,
            value: U256::ZERO,
            access_list: Default::default(),
            input,
        }),
        Fees::Legacy { gas_price } => TypedTransaction::Legacy(TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Create,
            value: U256::ZERO,
            input,
        }),
    }
}

/// Sign `tx` and return its hash with the raw EIP-2718 encoding.
pub fn sign_transaction(
    tx: TypedTransaction,
    signer: &PrivateKeySigner,
) -> anyhow::Result<(B256, Bytes)> {
    match tx {
        TypedTransaction::Eip1559(tx) => sign_typed(tx, signer),
        TypedTransaction::Legacy(tx) => sign_typed(tx, signer),
        other => anyhow::bail!("Unsupported creation transaction type {:?}", other.tx_type()),
    }
}

fn sign_typed<T>(tx: T, signer: &PrivateKeySigner) -> anyhow::Result<(B256, Bytes)>
where
    T: SignableTransaction<Signature> + alloy_consensus::transaction::RlpEcdsaEncodableTx,
    TxEnvelope: From<Signed<T>>,
{
    let signature = signer
        .sign_hash_sync(&tx.signature_hash())
        .context("Failed to sign creation transaction")?;
    let signed_tx = tx.into_signed(signature);
    let tx_hash = *signed_tx.hash();

    let raw_tx: Bytes = TxEnvelope::from(signed_tx).encoded_2718().into();

    Ok((tx_hash, raw_tx))
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::keccak256;

    use super::*;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_fees_from_base_fee() {
        let fees = Fees::from_base_fee(10_000_000_000, 1_500_000_000);
        assert_eq!(
            fees,
            Fees::Eip1559 {
                max_fee_per_gas: 21_500_000_000,
                max_priority_fee_per_gas: 1_500_000_000,
            }
        );

        let Fees::Eip1559 { max_fee_per_gas, .. } = Fees::from_base_fee(u128::MAX, 1) else {
            panic!("expected EIP-1559 fees");
        };
        assert_eq!(max_fee_per_gas, u128::MAX);
    }

    #[test]
    fn test_gas_limit_with_margin() {
        assert_eq!(gas_limit_with_margin(1_000_000, 20), 1_200_000);
        assert_eq!(gas_limit_with_margin(21_000, 0), 21_000);
        assert_eq!(gas_limit_with_margin(u64::MAX, 20), u64::MAX);
    }

    #[test]
    fn test_sign_creation_transaction() {
        let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();
        let tx = creation_transaction(
            31337,
            0,
            3_000_000,
            Fees::from_base_fee(1_000_000_000, 1_000_000_000),
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        );

        let (tx_hash, raw_tx) = sign_transaction(tx, &signer).unwrap();

        // EIP-1559 envelope type byte.
        assert_eq!(raw_tx[0], 0x02);
        assert_eq!(keccak256(&raw_tx), tx_hash);
    }

    #[test]
    fn test_sign_legacy_creation_transaction() {
        let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();
        let tx = creation_transaction(
            31337,
            3,
            3_000_000,
            Fees::from_gas_price(1_000_000_000),
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        );
        assert!(matches!(tx, TypedTransaction::Legacy(ref legacy) if legacy.chain_id == Some(31337)));

        let (tx_hash, raw_tx) = sign_transaction(tx, &signer).unwrap();

        // Legacy transactions are a bare RLP list, without a type byte.
        assert!(raw_tx[0] >= 0xc0);
        assert_eq!(keccak256(&raw_tx), tx_hash);
    }
}
