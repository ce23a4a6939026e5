//! Error taxonomy for the swap pipeline
//!
//! Every component returns its own typed error. The orchestrator wraps them in
//! [`SwapError`] together with the phase that failed and, when one exists, the
//! hash of the transaction involved, so the caller can decide whether to resubmit.

use alloy_primitives::{Address, B256};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which transaction of a run an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Approval,
    Swap,
    Harvest,
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPhase::Approval => write!(f, "approval"),
            TxPhase::Swap => write!(f, "swap"),
            TxPhase::Harvest => write!(f, "harvest"),
        }
    }
}

/// Missing credentials, bad endpoint or an inconsistent deployment.
/// Always raised before any chain interaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("private key belongs to {signer}, not to configured account {account}")]
    AccountMismatch { account: Address, signer: Address },

    #[error("node reports chain id {actual}, deployment expects {expected}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("could not read chain id from node: {0}")]
    ChainIdUnavailable(ChainError),

    #[error("unknown token symbol: {0}")]
    UnknownToken(String),

    #[error("invalid deployment: {0}")]
    InvalidDeployment(String),

    #[error("failed to read deployment file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse deployment file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures reported by the chain client collaborator
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("node unreachable: {0}")]
    Transport(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("node rejected transaction: {0}")]
    Rejected(String),

    #[error("no receipt for {hash} after {waited:?}")]
    ReceiptTimeout { hash: B256, waited: Duration },
}

/// Degenerate oracle data or out-of-range amounts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("normalized price of the output token is zero")]
    ZeroPrice,

    #[error("arithmetic overflow while computing quote")]
    Overflow,

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("slippage tolerance {0} bps exceeds 10000 bps")]
    InvalidSlippage(u16),

    #[error("unsupported decimal precision {0}")]
    UnsupportedDecimals(u8),
}

/// Raised while turning a contract call into an unsigned transaction,
/// always before anything is signed.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("no contract registered at {0}")]
    UnknownContract(Address),

    #[error("{function} function not found in {contract} interface")]
    UnknownFunction {
        contract: &'static str,
        function: &'static str,
    },

    #[error("invalid gas price {value:?} gwei: {reason}")]
    InvalidGasPrice { value: String, reason: String },

    #[error("could not read account nonce: {0}")]
    NonceUnavailable(ChainError),

    #[error("node returned nonce {got}, but nonce {previous} was already used in this run")]
    StaleNonce { previous: u64, got: u64 },

    #[error("swap deadline {window_secs}s from now does not fit in a timestamp")]
    DeadlineOverflow { window_secs: u64 },
}

/// Sign, broadcast or receipt-wait failure of a single transaction
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("failed to sign transaction: {0}")]
    Sign(String),

    #[error("broadcast failed: {0}")]
    Broadcast(ChainError),

    /// The transaction was handed to the node but no receipt showed up in time.
    /// Whether `nonce` has been consumed is unknown until the account's
    /// transaction count is read again.
    #[error("transaction {tx_hash} (nonce {nonce}) not mined after {waited:?}; nonce may or may not be consumed")]
    ReceiptTimeout {
        tx_hash: B256,
        nonce: u64,
        waited: Duration,
    },

    #[error("failed to fetch receipt for {tx_hash}: {source}")]
    ReceiptUnavailable { tx_hash: B256, source: ChainError },
}

impl SubmissionError {
    /// Hash of the transaction, if it got far enough to have one on the node
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            SubmissionError::ReceiptTimeout { tx_hash, .. }
            | SubmissionError::ReceiptUnavailable { tx_hash, .. } => Some(*tx_hash),
            SubmissionError::Sign(_) | SubmissionError::Broadcast(_) => None,
        }
    }
}

/// Error surfaced at the orchestrator boundary
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("oracle read failed for token {token}: {source}")]
    OracleRead { token: Address, source: ChainError },

    #[error("quote failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("{phase} transaction could not be built: {source}")]
    Build { phase: TxPhase, source: BuildError },

    #[error("{phase} transaction submission failed: {source}")]
    Submission {
        phase: TxPhase,
        source: SubmissionError,
    },
}

impl SwapError {
    /// Phase of the failing transaction, `None` for failures before any transaction
    pub fn phase(&self) -> Option<TxPhase> {
        match self {
            SwapError::Build { phase, .. } | SwapError::Submission { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            SwapError::Submission { source, .. } => source.tx_hash(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_keeps_hash_and_phase() {
        let hash = B256::repeat_byte(0xab);
        let err = SwapError::Submission {
            phase: TxPhase::Swap,
            source: SubmissionError::ReceiptTimeout {
                tx_hash: hash,
                nonce: 7,
                waited: Duration::from_secs(120),
            },
        };

        assert_eq!(err.phase(), Some(TxPhase::Swap));
        assert_eq!(err.tx_hash(), Some(hash));
        assert!(err.to_string().contains("nonce may or may not be consumed"));
    }

    #[test]
    fn test_broadcast_failure_has_no_hash() {
        let err = SwapError::Submission {
            phase: TxPhase::Approval,
            source: SubmissionError::Broadcast(ChainError::Rejected("nonce too low".into())),
        };
        assert_eq!(err.tx_hash(), None);
        assert!(err.to_string().starts_with("approval transaction"));
    }
}
