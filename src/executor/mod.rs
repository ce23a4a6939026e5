//! The Executor
//!
//! This module turns contract calls into signed transactions:
//! - Contract interfaces and per-contract function schemas
//! - Unsigned legacy transaction building (fresh nonce per transaction)
//! - Local signing, raw broadcast and receipt waiting
//!
//! ⚠️  WARNING: This module interacts with real funds!

mod builder;
pub(crate) mod contracts;
mod submitter;

pub use builder::TransactionBuilder;
pub use contracts::{ContractCall, ContractRole, IPriceOracle};
pub use submitter::{parse_private_key, TransactionSubmitter};
