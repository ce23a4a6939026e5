//! Transaction Builder
//!
//! Turns a typed [`ContractCall`] into a legacy-priced unsigned transaction:
//! the call is checked against the target contract's function schema first, then
//! the sender's nonce is read fresh from the node.

use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::contracts::{ContractCall, FunctionSpec};
use crate::chain::{gwei_to_wei, ChainClient};
use crate::config::DeploymentConfig;
use crate::error::BuildError;

/// A transaction ready to be signed
///
/// Not `Clone`: the nonce ties it to a single slot in the sender's sequence, so
/// it is built once and consumed by exactly one submission.
#[derive(Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub to: Address,
    pub function: &'static str,
    pub selector: [u8; 4],
    pub input: Bytes,
    pub chain_id: u64,
    pub gas_limit: u64,
    /// Legacy gas price, in wei
    pub gas_price: u128,
    pub nonce: u64,
}

impl UnsignedTransaction {
    /// `{chainId, gas, gasPrice, nonce, to, data}` as the node expects it
    pub fn rpc_shape(&self) -> Value {
        json!({
            "chainId": self.chain_id,
            "gas": self.gas_limit,
            "gasPrice": self.gas_price.to_string(),
            "nonce": self.nonce,
            "to": format!("{:?}", self.to),
            "data": format!("0x{}", hex::encode(&self.input)),
        })
    }

    pub(crate) fn into_legacy(self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: U256::ZERO,
            input: self.input,
        }
    }
}

/// Builds unsigned transactions for the contracts of one deployment
pub struct TransactionBuilder {
    client: Arc<dyn ChainClient>,
    deployment: Arc<DeploymentConfig>,
}

impl TransactionBuilder {
    pub fn new(client: Arc<dyn ChainClient>, deployment: Arc<DeploymentConfig>) -> Self {
        Self { client, deployment }
    }

    /// Check that the call's function exists on the contract at its target
    pub fn validate(&self, call: &ContractCall) -> Result<&'static FunctionSpec, BuildError> {
        let target = call.target();
        let role = self
            .deployment
            .contract_role(target)
            .ok_or(BuildError::UnknownContract(target))?;

        role.find(call.function_name(), call.selector())
            .ok_or(BuildError::UnknownFunction {
                contract: role.name(),
                function: call.function_name(),
            })
    }

    /// Build with an explicit nonce
    pub fn build_with_nonce(
        &self,
        call: &ContractCall,
        nonce: u64,
    ) -> Result<UnsignedTransaction, BuildError> {
        let spec = self.validate(call)?;
        let gas_price = gwei_to_wei(&self.deployment.gas_price_gwei)?;

        Ok(UnsignedTransaction {
            to: call.target(),
            function: spec.name,
            selector: spec.selector,
            input: call.calldata(),
            chain_id: self.deployment.chain_id,
            gas_limit: self.deployment.gas_limit,
            gas_price,
            nonce,
        })
    }

    /// Validate, read the sender's current nonce, and build.
    ///
    /// Validation happens before the nonce read so a bad call never costs a
    /// round trip, let alone a nonce.
    pub async fn build(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> Result<UnsignedTransaction, BuildError> {
        self.validate(call)?;

        let nonce = self
            .client
            .transaction_count(sender)
            .await
            .map_err(BuildError::NonceUnavailable)?;

        let tx = self.build_with_nonce(call, nonce)?;
        debug!("Built {} transaction: {}", tx.function, tx.rpc_shape());
        Ok(tx)
    }
}
