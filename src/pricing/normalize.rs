//! Decimal normalization of raw oracle prices

use alloy_primitives::U256;

use crate::error::QuoteError;

/// Reference precision every normalized price is expressed in
pub const REFERENCE_DECIMALS: u8 = 18;

/// Largest power of ten that fits in a U256 is 10^77
pub const MAX_DECIMALS: u8 = 77;

/// Raw oracle price, only meaningful together with the token's decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub raw: U256,
    pub decimals: u8,
}

impl Price {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (token decimals: {})", self.raw, self.decimals)
    }
}

/// Price at the reference precision; directly comparable across tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NormalizedPrice(U256);

impl NormalizedPrice {
    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// Bring a raw oracle price to `reference_decimals` precision.
///
/// The oracle scales prices by `2 * reference - token_decimals`, so the raw value
/// is divided (or, for tokens above the reference precision, multiplied) by the
/// power of ten separating `token_decimals + reference` from `2 * reference`.
/// Division truncates toward zero like the on-chain integer math does.
pub fn normalize(price: &Price, reference_decimals: u8) -> Result<NormalizedPrice, QuoteError> {
    for decimals in [price.decimals, reference_decimals] {
        if decimals > MAX_DECIMALS {
            return Err(QuoteError::UnsupportedDecimals(decimals));
        }
    }

    let combined = u32::from(price.decimals) + u32::from(reference_decimals);
    let pivot = 2 * u32::from(reference_decimals);

    let value = if combined <= pivot {
        price.raw / pow10(pivot - combined)?
    } else {
        price
            .raw
            .checked_mul(pow10(combined - pivot)?)
            .ok_or(QuoteError::Overflow)?
    };

    Ok(NormalizedPrice(value))
}

pub(crate) fn pow10(exp: u32) -> Result<U256, QuoteError> {
    U256::from(10u64)
        .checked_pow(U256::from(exp))
        .ok_or(QuoteError::Overflow)
}
