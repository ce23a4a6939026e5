//! Chain client collaborator
//!
//! Everything the swap pipeline needs from a node, behind one trait so the
//! pipeline can run against a live RPC endpoint or a scripted mock.

mod rpc;
#[cfg(test)]
pub(crate) mod mock;

pub use rpc::RpcChainClient;

use alloy_primitives::{utils::parse_units, Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::{BuildError, ChainError};

/// On-chain outcome of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Terminal record of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub tx_hash: B256,
    pub status: ReceiptStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// Read, nonce, broadcast and receipt access to one chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id reported by the node
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Read-only contract call (`eth_call`)
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;

    /// Current transaction count of `address`
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError>;

    /// Broadcast a signed, EIP-2718 encoded transaction and return its hash
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainError>;

    /// Block until the transaction is mined or the client's wait times out
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, ChainError>;
}

/// Convert a human-readable gas price ("1000", "1.5") in gwei to wei
pub fn gwei_to_wei(gas_price_gwei: &str) -> Result<u128, BuildError> {
    let invalid = |reason: String| BuildError::InvalidGasPrice {
        value: gas_price_gwei.to_string(),
        reason,
    };

    let trimmed = gas_price_gwei.trim();
    if trimmed.starts_with('-') {
        return Err(invalid("negative gas price".to_string()));
    }

    let wei = parse_units(trimmed, "gwei")
        .map_err(|e| invalid(e.to_string()))?
        .get_absolute();

    if wei > U256::from(u128::MAX) {
        return Err(invalid("does not fit in 128 bits".to_string()));
    }
    Ok(wei.to::<u128>())
}
