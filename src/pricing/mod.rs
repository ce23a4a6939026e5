//! Pricing: oracle price normalization and cross-token quotes
//!
//! Oracle prices arrive as raw integers whose scale depends on the token's own
//! decimals. They are brought to a single 18-decimal reference precision before
//! two of them are ever compared.

mod normalize;
mod quote;

pub use normalize::{Price, MAX_DECIMALS};
pub use quote::{HumanAmount, Quote, QuoteCalculator, SlippageTolerance};
