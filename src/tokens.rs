//! Token definitions for the ShimmerSea deployment
//!
//! Every on-chain amount and oracle price only means something together with the
//! decimal precision of its token, so the two always travel as a [`TokenDescriptor`].

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// LUM, the ShimmerSea reward token (18 decimals)
pub const LUM_ADDRESS: Address = address!("4794Aeafa5Efe2fC1F6f5eb745798aaF39A81D3e");
pub const LUM_DECIMALS: u8 = 18;

/// Wrapped SMR, the native ShimmerEVM asset (6 decimals, "mwei")
pub const SMR_ADDRESS: Address = address!("1074010000000000000000000000000000000000");
pub const SMR_DECIMALS: u8 = 6;

/// A token we can quote and swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(symbol: impl Into<String>, address: Address, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            address,
            decimals,
        }
    }

    pub fn lum() -> Self {
        Self::new("LUM", LUM_ADDRESS, LUM_DECIMALS)
    }

    pub fn smr() -> Self {
        Self::new("SMR", SMR_ADDRESS, SMR_DECIMALS)
    }
}

impl std::fmt::Display for TokenDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}, {} decimals)", self.symbol, self.address, self.decimals)
    }
}

/// Tokens supported by the default deployment
pub fn default_tokens() -> Vec<TokenDescriptor> {
    vec![TokenDescriptor::lum(), TokenDescriptor::smr()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let tokens = default_tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].decimals, 18);
        assert_eq!(tokens[1].decimals, 6);
        assert_ne!(tokens[0].address, tokens[1].address);
    }
}
