//! Price oracle reads
//!
//! `getPrice(token, decimals)` on the ShimmerSea price getter. Read-only: no gas,
//! no nonce. Failures are reported as they come, retrying is left to the caller.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use tracing::debug;

use crate::chain::ChainClient;
use crate::error::{ChainError, SwapError};
use crate::executor::IPriceOracle;
use crate::pricing::Price;
use crate::tokens::TokenDescriptor;

/// Client for the deployment's price oracle contract
pub struct PriceOracleClient {
    client: Arc<dyn ChainClient>,
    oracle: Address,
}

impl PriceOracleClient {
    pub fn new(client: Arc<dyn ChainClient>, oracle: Address) -> Self {
        Self { client, oracle }
    }

    /// Raw price of `token`, paired with the decimals it was requested at
    pub async fn get_price(&self, token: Address, decimals: u8) -> Result<Price, SwapError> {
        let data = IPriceOracle::getPriceCall {
            token,
            decimals: U256::from(decimals),
        }
        .abi_encode();

        let output = self
            .client
            .call(self.oracle, Bytes::from(data))
            .await
            .map_err(|source| SwapError::OracleRead { token, source })?;

        let raw = IPriceOracle::getPriceCall::abi_decode_returns(&output).map_err(|e| {
            SwapError::OracleRead {
                token,
                source: ChainError::Reverted(format!("undecodable oracle response: {}", e)),
            }
        })?;

        debug!("Oracle price for {:?}: {} ({} decimals)", token, raw, decimals);
        Ok(Price::new(raw, decimals))
    }

    /// Price of a configured token, at its own decimals
    pub async fn price_of(&self, token: &TokenDescriptor) -> Result<Price, SwapError> {
        self.get_price(token.address, token.decimals).await
    }
}
