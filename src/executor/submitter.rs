//! Transaction Submitter
//!
//! Signs unsigned transactions locally, broadcasts them in raw form and waits
//! for their receipts.
//!
//! ⚠️  SECURITY WARNING:
//! - Never log or expose private keys
//! - Keys come from the environment, never from the deployment file

use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::builder::UnsignedTransaction;
use crate::chain::{ChainClient, Receipt};
use crate::error::{ChainError, SubmissionError};

/// Parse a hex private key, with or without `0x`
pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner, String> {
    let key = key.trim().trim_start_matches("0x");
    PrivateKeySigner::from_str(key).map_err(|e| e.to_string())
}

/// A signed, encoded transaction
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_hash: B256,
    pub nonce: u64,
    pub raw: Bytes,
}

/// Signs and submits transactions for one account
pub struct TransactionSubmitter {
    client: Arc<dyn ChainClient>,
    signer: PrivateKeySigner,
}

impl TransactionSubmitter {
    pub fn new(client: Arc<dyn ChainClient>, signer: PrivateKeySigner) -> Self {
        Self { client, signer }
    }

    /// Address transactions are sent from
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a legacy transaction and encode it for `eth_sendRawTransaction`
    pub async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SubmissionError> {
        let nonce = tx.nonce;
        let function = tx.function;
        let legacy = tx.into_legacy();

        let sig_hash = legacy.signature_hash();
        let signature = self
            .signer
            .sign_hash(&sig_hash)
            .await
            .map_err(|e| SubmissionError::Sign(e.to_string()))?;

        let signed = legacy.into_signed(signature);
        let tx_hash = *signed.hash();
        let raw = Bytes::from(TxEnvelope::Legacy(signed).encoded_2718());

        debug!(
            "Signed {} transaction: hash={}, nonce={}, {} bytes",
            function,
            tx_hash,
            nonce,
            raw.len()
        );

        Ok(SignedTransaction { tx_hash, nonce, raw })
    }

    /// Sign, broadcast and wait for the receipt.
    ///
    /// A reverted receipt is returned as `Ok`; the caller decides what a revert
    /// means for the run.
    pub async fn submit(&self, tx: UnsignedTransaction) -> Result<Receipt, SubmissionError> {
        let function = tx.function;
        let signed = self.sign(tx).await?;

        let tx_hash = self
            .client
            .send_raw_transaction(signed.raw.clone())
            .await
            .map_err(SubmissionError::Broadcast)?;
        info!("📤 {} sent: {} (nonce {})", function, tx_hash, signed.nonce);
        if tx_hash != signed.tx_hash {
            warn!(
                "⚠️  Node reported hash {} but the signed payload hashes to {}",
                tx_hash, signed.tx_hash
            );
        }

        let receipt = self
            .client
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| match e {
                ChainError::ReceiptTimeout { waited, .. } => SubmissionError::ReceiptTimeout {
                    tx_hash,
                    nonce: signed.nonce,
                    waited,
                },
                source => SubmissionError::ReceiptUnavailable { tx_hash, source },
            })?;

        debug!(
            "Receipt for {}: {:?} in block {:?}, gas used {}",
            tx_hash, receipt.status, receipt.block_number, receipt.gas_used
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChainClient;
    use crate::chain::ReceiptStatus;
    use alloy_primitives::{keccak256, U256};

    // Well-known development key (DO NOT USE IN PRODUCTION)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn unsigned(nonce: u64) -> UnsignedTransaction {
        UnsignedTransaction {
            to: Address::repeat_byte(0x11),
            function: "approve",
            selector: [0x09, 0x5e, 0xa7, 0xb3],
            input: Bytes::from(vec![0x09, 0x5e, 0xa7, 0xb3]),
            chain_id: 148,
            gas_limit: 800_000,
            gas_price: 1_000_000_000_000,
            nonce,
        }
    }

    fn submitter(client: Arc<MockChainClient>) -> TransactionSubmitter {
        TransactionSubmitter::new(client, parse_private_key(TEST_KEY).unwrap())
    }

    #[test]
    fn test_parse_private_key_prefix_optional() {
        let with = parse_private_key(TEST_KEY).unwrap();
        let without = parse_private_key(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with.address(), without.address());
        assert!(parse_private_key("0xnothex").is_err());
    }

    #[tokio::test]
    async fn test_sign_produces_legacy_envelope() {
        let client = Arc::new(MockChainClient::new(148));
        let signed = submitter(client).sign(unsigned(5)).await.unwrap();

        assert_eq!(signed.nonce, 5);
        assert_eq!(signed.tx_hash, keccak256(&signed.raw));
        // Legacy transactions are a bare RLP list, no type byte
        assert!(signed.raw[0] >= 0xc0);
    }

    #[tokio::test]
    async fn test_submit_returns_receipt() {
        let client = Arc::new(MockChainClient::new(148).with_nonce(2));
        let receipt = submitter(client.clone()).submit(unsigned(2)).await.unwrap();

        assert!(receipt.is_success());
        let sent = client.broadcasts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tx().nonce, 2);
        assert_eq!(sent[0].tx().chain_id, Some(148));
        assert_eq!(sent[0].tx().value, U256::ZERO);
        assert_eq!(*sent[0].hash(), receipt.tx_hash);
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_not_an_error() {
        let client = Arc::new(MockChainClient::new(148).with_receipts(&[ReceiptStatus::Reverted]));
        let receipt = submitter(client).submit(unsigned(0)).await.unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Reverted);
    }

    #[tokio::test]
    async fn test_broadcast_rejection() {
        let client = Arc::new(
            MockChainClient::new(148)
                .with_broadcast_error(ChainError::Rejected("insufficient funds".into())),
        );
        let err = submitter(client).submit(unsigned(0)).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Broadcast(ChainError::Rejected(_))));
        assert_eq!(err.tx_hash(), None);
    }

    #[tokio::test]
    async fn test_receipt_timeout_keeps_nonce_and_hash() {
        let client = Arc::new(MockChainClient::new(148).with_nonce(9).with_receipt_timeout());
        let err = submitter(client.clone()).submit(unsigned(9)).await.unwrap_err();

        match err {
            SubmissionError::ReceiptTimeout { tx_hash, nonce, .. } => {
                assert_eq!(nonce, 9);
                assert_eq!(tx_hash, *client.broadcasts()[0].hash());
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
