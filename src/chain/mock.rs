//! Scripted in-memory chain client for tests

use alloy_consensus::{Signed, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::{ChainClient, Receipt, ReceiptStatus};
use crate::error::ChainError;
use crate::executor::IPriceOracle;

#[derive(Default)]
struct MockState {
    chain_id: u64,
    prices: HashMap<Address, U256>,
    oracle_error: Option<ChainError>,
    nonce: u64,
    nonce_reads: usize,
    lagging_nonce: bool,
    /// Error returned once this many broadcasts have been accepted
    broadcast_error: Option<(usize, ChainError)>,
    receipt_timeout: bool,
    receipt_statuses: VecDeque<ReceiptStatus>,
    broadcasts: Vec<Bytes>,
    oracle_calls: Vec<(Address, U256)>,
}

/// Chain client whose answers are set up by the test
pub struct MockChainClient {
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id,
                ..Default::default()
            }),
        }
    }

    pub fn with_price(self, token: Address, raw: U256) -> Self {
        self.state.lock().unwrap().prices.insert(token, raw);
        self
    }

    /// Transaction count of the (single) sending account
    pub fn with_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().nonce = nonce;
        self
    }

    pub fn with_oracle_error(self, error: ChainError) -> Self {
        self.state.lock().unwrap().oracle_error = Some(error);
        self
    }

    /// Every nonce read after the first one reports the count from before the
    /// last accepted transaction, like a node that is a block behind
    pub fn with_lagging_nonce(self) -> Self {
        self.state.lock().unwrap().lagging_nonce = true;
        self
    }

    pub fn with_broadcast_error(self, error: ChainError) -> Self {
        self.with_broadcast_error_after(0, error)
    }

    /// Accept `accepted` broadcasts, then reject every following one
    pub fn with_broadcast_error_after(self, accepted: usize, error: ChainError) -> Self {
        self.state.lock().unwrap().broadcast_error = Some((accepted, error));
        self
    }

    pub fn with_receipt_timeout(self) -> Self {
        self.state.lock().unwrap().receipt_timeout = true;
        self
    }

    /// Statuses handed out to successive receipts; defaults to success once drained
    pub fn with_receipts(self, statuses: &[ReceiptStatus]) -> Self {
        self.state
            .lock()
            .unwrap()
            .receipt_statuses
            .extend(statuses.iter().copied());
        self
    }

    pub fn nonce_reads(&self) -> usize {
        self.state.lock().unwrap().nonce_reads
    }

    pub fn oracle_calls(&self) -> Vec<(Address, U256)> {
        self.state.lock().unwrap().oracle_calls.clone()
    }

    /// Every transaction that reached the node, decoded
    pub fn broadcasts(&self) -> Vec<Signed<TxLegacy>> {
        self.state
            .lock()
            .unwrap()
            .broadcasts
            .iter()
            .map(|raw| {
                let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
                envelope.as_legacy().cloned().expect("legacy transaction")
            })
            .collect()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.oracle_error.clone() {
            return Err(error);
        }

        let call = IPriceOracle::getPriceCall::abi_decode(&data)
            .map_err(|e| ChainError::Reverted(e.to_string()))?;
        state.oracle_calls.push((call.token, call.decimals));

        let price = state
            .prices
            .get(&call.token)
            .copied()
            .ok_or_else(|| ChainError::Reverted("unknown token".to_string()))?;
        Ok(Bytes::from(price.abi_encode()))
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.nonce_reads += 1;
        if state.lagging_nonce && state.nonce_reads > 1 {
            return Ok(state.nonce.saturating_sub(1));
        }
        Ok(state.nonce)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainError> {
        let mut state = self.state.lock().unwrap();
        if let Some((accepted, error)) = &state.broadcast_error {
            if state.broadcasts.len() >= *accepted {
                return Err(error.clone());
            }
        }

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| ChainError::Rejected(e.to_string()))?;
        let signed = envelope
            .as_legacy()
            .ok_or_else(|| ChainError::Rejected("only legacy transactions accepted".to_string()))?;
        if signed.tx().nonce != state.nonce {
            return Err(ChainError::Rejected(format!(
                "nonce {} does not match account nonce {}",
                signed.tx().nonce,
                state.nonce
            )));
        }
        state.nonce += 1;

        let hash = keccak256(&raw);
        state.broadcasts.push(raw);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        if state.receipt_timeout {
            return Err(ChainError::ReceiptTimeout {
                hash: tx_hash,
                waited: Duration::from_secs(120),
            });
        }

        let status = state
            .receipt_statuses
            .pop_front()
            .unwrap_or(ReceiptStatus::Success);
        Ok(Receipt {
            tx_hash,
            status,
            block_number: Some(1_000 + state.broadcasts.len() as u64),
            gas_used: 21_000,
        })
    }
}
