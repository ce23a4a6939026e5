//! Chain client backed by an alloy HTTP provider

use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_transport::TransportError;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::{ChainClient, Receipt, ReceiptStatus};
use crate::config::DeploymentConfig;
use crate::error::ChainError;

/// JSON-RPC chain client
///
/// A fresh provider is built per call; nothing is cached between calls, so every
/// nonce read reflects the node's state at that moment.
pub struct RpcChainClient {
    rpc_url: String,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl RpcChainClient {
    pub fn new(rpc_url: String, receipt_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            rpc_url,
            receipt_timeout,
            poll_interval,
        }
    }

    /// Client using the receipt wait settings of a deployment
    pub fn for_deployment(rpc_url: String, deployment: &DeploymentConfig) -> Self {
        Self::new(
            rpc_url,
            Duration::from_secs(deployment.receipt_timeout_secs),
            Duration::from_millis(deployment.receipt_poll_interval_ms),
        )
    }

    fn provider(&self) -> Result<impl Provider, ChainError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Transport(format!("invalid node url: {}", e)))?;
        Ok(ProviderBuilder::new().connect_http(url))
    }
}

/// Reverts are reported by the node as JSON-RPC errors mentioning "revert"
fn classify_call_error(err: TransportError) -> ChainError {
    let message = err.to_string();
    if message.to_lowercase().contains("revert") {
        ChainError::Reverted(message)
    } else {
        ChainError::Transport(message)
    }
}

/// A JSON-RPC error payload on broadcast means the node looked at the
/// transaction and refused it; anything else never reached the node.
fn classify_broadcast_error(err: TransportError) -> ChainError {
    if err.as_error_resp().is_some() {
        ChainError::Rejected(err.to_string())
    } else {
        ChainError::Transport(err.to_string())
    }
}

fn to_receipt(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        tx_hash: receipt.transaction_hash,
        status: if receipt.status() {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Reverted
        },
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider()?
            .get_chain_id()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let provider = self.provider()?;
        let tx = TransactionRequest::default().to(to).input(data.into());

        provider.call(tx).await.map_err(classify_call_error)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        let nonce = self
            .provider()?
            .get_transaction_count(address)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        debug!("Nonce for {:?}: {}", address, nonce);
        Ok(nonce)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainError> {
        let pending = self
            .provider()?
            .send_raw_transaction(&raw)
            .await
            .map_err(classify_broadcast_error)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, ChainError> {
        let provider = self.provider()?;
        let start = Instant::now();

        loop {
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ChainError::Transport(e.to_string()))?;

            if let Some(receipt) = receipt {
                return Ok(to_receipt(&receipt));
            }

            let waited = start.elapsed();
            if waited >= self.receipt_timeout {
                return Err(ChainError::ReceiptTimeout {
                    hash: tx_hash,
                    waited,
                });
            }

            trace!("Receipt for {} not available yet ({:?})", tx_hash, waited);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_transport::TransportErrorKind;

    fn error_response(code: i64, message: &str) -> TransportError {
        let payload = serde_json::json!({ "code": code, "message": message }).to_string();
        TransportError::err_resp(serde_json::from_str(&payload).unwrap())
    }

    #[test]
    fn test_call_revert_is_classified() {
        let err = error_response(3, "execution reverted: price feed paused");
        assert!(matches!(classify_call_error(err), ChainError::Reverted(m) if m.contains("price feed paused")));
    }

    #[test]
    fn test_call_transport_failure() {
        let err = TransportErrorKind::custom_str("connection refused");
        assert!(matches!(classify_call_error(err), ChainError::Transport(_)));
    }

    #[test]
    fn test_broadcast_refusal_is_rejected() {
        let err = error_response(-32000, "nonce too low");
        assert!(matches!(classify_broadcast_error(err), ChainError::Rejected(m) if m.contains("nonce too low")));
    }

    #[test]
    fn test_broadcast_transport_failure() {
        let err = TransportErrorKind::custom_str("connection refused");
        assert!(matches!(classify_broadcast_error(err), ChainError::Transport(_)));
    }
}
