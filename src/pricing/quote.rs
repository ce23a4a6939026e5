//! Cross-token quotes with an explicit slippage tolerance

use alloy_primitives::{utils::parse_ether, U256};
use serde::Serialize;
use std::str::FromStr;

use super::normalize::{normalize, pow10, Price, MAX_DECIMALS, REFERENCE_DECIMALS};
use crate::error::QuoteError;
use crate::tokens::TokenDescriptor;

const BPS_DENOMINATOR: u16 = 10_000;

// ============================================
// HUMAN AMOUNTS
// ============================================

/// Amount in whole-token units ("0.00001 LUM"), held as an 18-decimal
/// fixed-point integer so no floating point ever touches a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct HumanAmount(U256);

impl HumanAmount {
    /// Wrap a value already expressed at the reference precision
    pub fn from_fixed(value: U256) -> Self {
        Self(value)
    }

    pub fn fixed(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Convert to the token's smallest unit, truncating toward zero
    pub fn to_base_units(&self, decimals: u8) -> Result<U256, QuoteError> {
        rescale(self.0, REFERENCE_DECIMALS, decimals)
    }
}

impl FromStr for HumanAmount {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') {
            return Err(QuoteError::InvalidAmount(s.to_string()));
        }
        parse_ether(trimmed)
            .map(Self)
            .map_err(|_| QuoteError::InvalidAmount(s.to_string()))
    }
}

impl std::fmt::Display for HumanAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = U256::from(10u64).pow(U256::from(REFERENCE_DECIMALS));
        let whole = self.0 / unit;
        let fraction = format!("{:0>18}", (self.0 % unit).to_string());
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            write!(f, "{}", whole)
        } else {
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

fn rescale(value: U256, from_decimals: u8, to_decimals: u8) -> Result<U256, QuoteError> {
    for decimals in [from_decimals, to_decimals] {
        if decimals > MAX_DECIMALS {
            return Err(QuoteError::UnsupportedDecimals(decimals));
        }
    }
    if to_decimals <= from_decimals {
        Ok(value / pow10(u32::from(from_decimals - to_decimals))?)
    } else {
        value
            .checked_mul(pow10(u32::from(to_decimals - from_decimals))?)
            .ok_or(QuoteError::Overflow)
    }
}

// ============================================
// SLIPPAGE
// ============================================

/// Maximum acceptable shortfall between estimated and received output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlippageTolerance {
    bps: u16,
}

impl SlippageTolerance {
    pub fn from_bps(bps: u16) -> Result<Self, QuoteError> {
        if bps > BPS_DENOMINATOR {
            return Err(QuoteError::InvalidSlippage(bps));
        }
        Ok(Self { bps })
    }

    /// `amount * (1 - tolerance)`, truncated toward zero
    pub fn apply(&self, amount: U256) -> Result<U256, QuoteError> {
        let kept = U256::from(BPS_DENOMINATOR - self.bps);
        amount
            .checked_mul(kept)
            .map(|v| v / U256::from(BPS_DENOMINATOR))
            .ok_or(QuoteError::Overflow)
    }
}

impl std::fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.bps / 100, self.bps % 100)
    }
}

// ============================================
// QUOTES
// ============================================

/// Swap amounts, each in its token's smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out_estimate: U256,
    pub amount_out_minimum: U256,
}

/// Combines two oracle prices into an output amount
#[derive(Debug, Clone, Copy)]
pub struct QuoteCalculator {
    slippage: SlippageTolerance,
}

impl QuoteCalculator {
    pub fn new(slippage: SlippageTolerance) -> Self {
        Self { slippage }
    }

    /// `normalize(price_from) * amount / normalize(price_to)`, in whole-token units
    pub fn exchange(
        &self,
        price_from: &Price,
        price_to: &Price,
        amount: HumanAmount,
    ) -> Result<HumanAmount, QuoteError> {
        let from = normalize(price_from, REFERENCE_DECIMALS)?;
        let to = normalize(price_to, REFERENCE_DECIMALS)?;
        if to.is_zero() {
            return Err(QuoteError::ZeroPrice);
        }

        let numerator = from
            .value()
            .checked_mul(amount.fixed())
            .ok_or(QuoteError::Overflow)?;

        Ok(HumanAmount::from_fixed(numerator / to.value()))
    }

    /// Native-unit quote for an already computed exchange, with the
    /// slippage-bounded minimum output
    pub fn quote(
        &self,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: HumanAmount,
        amount_out: HumanAmount,
    ) -> Result<Quote, QuoteError> {
        let amount_out_estimate = amount_out.to_base_units(token_out.decimals)?;

        Ok(Quote {
            amount_in: amount_in.to_base_units(token_in.decimals)?,
            amount_out_estimate,
            amount_out_minimum: self.slippage.apply(amount_out_estimate)?,
        })
    }
}
