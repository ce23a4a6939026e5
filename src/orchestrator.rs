//! Swap Orchestrator
//!
//! The closed set of operations this tool runs against a deployment:
//! - `quote`: oracle prices and a slippage-bounded quote, no transactions
//! - `swap`: approve the router, then swap, with a hard stop on a rejected approval
//! - `harvest`: collect farm rewards for a set of pool ids
//!
//! Runs are strictly sequential. Nonces are read fresh from the node for every
//! transaction and never reserved, so two runs sharing one account must not
//! overlap.

use alloy_primitives::{Address, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chain::{ChainClient, Receipt};
use crate::config::{DeploymentConfig, PRIVATE_KEY_VAR};
use crate::error::{BuildError, ConfigError, QuoteError, SwapError, TxPhase};
use crate::executor::{ContractCall, TransactionBuilder, TransactionSubmitter};
use crate::oracle::PriceOracleClient;
use crate::pricing::{HumanAmount, Price, Quote, QuoteCalculator, SlippageTolerance};
use crate::tokens::TokenDescriptor;

// ============================================
// REQUESTS & RESULTS
// ============================================

/// Price a swap without sending anything
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub token_in: TokenDescriptor,
    pub token_out: TokenDescriptor,
    pub amount_in: HumanAmount,
    pub slippage: SlippageTolerance,
}

/// Approve-then-swap of an exact input amount
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: TokenDescriptor,
    pub token_out: TokenDescriptor,
    pub amount_in: HumanAmount,
    pub slippage: SlippageTolerance,
    /// Receiver of the output tokens, the sending account when `None`
    pub recipient: Option<Address>,
}

impl SwapRequest {
    fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            token_in: self.token_in.clone(),
            token_out: self.token_out.clone(),
            amount_in: self.amount_in,
            slippage: self.slippage,
        }
    }
}

/// Harvest farm rewards for the given pool ids
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub pids: Vec<u64>,
}

/// Everything computed while quoting
#[derive(Debug, Clone)]
pub struct QuoteReport {
    pub price_in: Price,
    pub price_out: Price,
    /// Output in whole-token units, before slippage
    pub amount_out: HumanAmount,
    pub quote: Quote,
}

/// A mined transaction of a run
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub nonce: u64,
    pub receipt: Receipt,
}

// ============================================
// STATE MACHINE
// ============================================

/// Position of a swap run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    Quoting,
    Approving,
    AwaitingApprovalReceipt,
    Swapping,
    AwaitingSwapReceipt,
    Done,
    /// Absorbing; the reason is in [`SwapRun::failure`]
    Failed,
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapState::Quoting => "quoting",
            SwapState::Approving => "approving",
            SwapState::AwaitingApprovalReceipt => "awaiting approval receipt",
            SwapState::Swapping => "swapping",
            SwapState::AwaitingSwapReceipt => "awaiting swap receipt",
            SwapState::Done => "done",
            SwapState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Why a swap run ended in [`SwapState::Failed`]
#[derive(Debug)]
pub enum SwapFailure {
    /// The approval was mined with status 0; no swap was built
    ApprovalRejected { tx_hash: B256 },
    Error(SwapError),
}

impl SwapFailure {
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            SwapFailure::ApprovalRejected { tx_hash } => Some(*tx_hash),
            SwapFailure::Error(e) => e.tx_hash(),
        }
    }
}

impl fmt::Display for SwapFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapFailure::ApprovalRejected { .. } => write!(f, "approval rejected"),
            SwapFailure::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Record of one swap run
#[derive(Debug)]
pub struct SwapRun {
    history: Vec<SwapState>,
    failure: Option<SwapFailure>,
    pub quote: Option<QuoteReport>,
    pub approval: Option<TransactionOutcome>,
    pub swap: Option<TransactionOutcome>,
}

impl SwapRun {
    fn start() -> Self {
        info!("🔄 Swap run: {}", SwapState::Quoting);
        Self {
            history: vec![SwapState::Quoting],
            failure: None,
            quote: None,
            approval: None,
            swap: None,
        }
    }

    fn advance(&mut self, next: SwapState) {
        info!("🔄 Swap run: {} → {}", self.state(), next);
        self.history.push(next);
    }

    fn fail(mut self, failure: SwapFailure) -> Self {
        error!("❌ Swap run failed while {}: {}", self.state(), failure);
        self.history.push(SwapState::Failed);
        self.failure = Some(failure);
        self
    }

    pub fn state(&self) -> SwapState {
        self.history.last().copied().unwrap_or(SwapState::Quoting)
    }

    /// Every state the run went through, in order
    pub fn history(&self) -> &[SwapState] {
        &self.history
    }

    pub fn failure(&self) -> Option<&SwapFailure> {
        self.failure.as_ref()
    }

    /// Receipts of the mined transactions, approval first
    pub fn receipts(&self) -> Vec<&Receipt> {
        self.approval
            .iter()
            .chain(self.swap.iter())
            .map(|outcome| &outcome.receipt)
            .collect()
    }
}

// ============================================
// ORCHESTRATOR
// ============================================

/// Sequences oracle reads, quoting and transactions for one deployment
pub struct SwapOrchestrator {
    client: Arc<dyn ChainClient>,
    deployment: Arc<DeploymentConfig>,
    oracle: PriceOracleClient,
    builder: TransactionBuilder,
    submitter: Option<TransactionSubmitter>,
}

impl SwapOrchestrator {
    /// Read-only orchestrator; `swap` and `harvest` need [`Self::with_signer`]
    pub fn new(client: Arc<dyn ChainClient>, deployment: DeploymentConfig) -> Self {
        let deployment = Arc::new(deployment);
        Self {
            oracle: PriceOracleClient::new(client.clone(), deployment.price_oracle),
            builder: TransactionBuilder::new(client.clone(), deployment.clone()),
            submitter: None,
            client,
            deployment,
        }
    }

    pub fn with_signer(mut self, signer: PrivateKeySigner) -> Self {
        self.submitter = Some(TransactionSubmitter::new(self.client.clone(), signer));
        self
    }

    /// Oracle prices for both tokens and the resulting quote
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteReport, SwapError> {
        if request.amount_in.is_zero() {
            return Err(QuoteError::InvalidAmount(request.amount_in.to_string()).into());
        }

        let price_in = self.oracle.price_of(&request.token_in).await?;
        let price_out = self.oracle.price_of(&request.token_out).await?;

        let calculator = QuoteCalculator::new(request.slippage);
        let amount_out = calculator.exchange(&price_in, &price_out, request.amount_in)?;
        let quote = calculator.quote(
            &request.token_in,
            &request.token_out,
            request.amount_in,
            amount_out,
        )?;

        info!(
            "💱 {} {} ≈ {} {} (min {} base units at {} slippage)",
            request.amount_in,
            request.token_in.symbol,
            amount_out,
            request.token_out.symbol,
            quote.amount_out_minimum,
            request.slippage
        );

        Ok(QuoteReport {
            price_in,
            price_out,
            amount_out,
            quote,
        })
    }

    /// Approve the router for the input amount, then swap.
    ///
    /// Never returns `Err`: every failure ends the run in [`SwapState::Failed`]
    /// with the phase and transaction hash attached.
    pub async fn swap(&self, request: SwapRequest) -> SwapRun {
        let mut run = SwapRun::start();

        let submitter = match self.submitter() {
            Ok(submitter) => submitter,
            Err(e) => return run.fail(SwapFailure::Error(e)),
        };
        let sender = submitter.address();

        // Quoting
        let report = match self.quote(&request.quote_request()).await {
            Ok(report) => report,
            Err(e) => return run.fail(SwapFailure::Error(e)),
        };
        let quote = report.quote;
        run.quote = Some(report);

        if let Err(e) = self.verify_chain_id().await {
            return run.fail(SwapFailure::Error(e));
        }
        // A deadline that cannot be expressed must not cost an approval
        if let Err(source) = self.swap_deadline() {
            return run.fail(SwapFailure::Error(build_error(TxPhase::Swap, source)));
        }

        // Approving
        run.advance(SwapState::Approving);
        let approve = ContractCall::Approve {
            token: request.token_in.address,
            spender: self.deployment.swap_router,
            amount: quote.amount_in,
        };
        let approval = match self.execute(submitter, &approve, sender, TxPhase::Approval).await {
            Ok(outcome) => outcome,
            Err(e) => return run.fail(SwapFailure::Error(e)),
        };
        run.advance(SwapState::AwaitingApprovalReceipt);

        let approval_nonce = approval.nonce;
        let approval_hash = approval.receipt.tx_hash;
        let approved = approval.receipt.is_success();
        run.approval = Some(approval);

        if !approved {
            return run.fail(SwapFailure::ApprovalRejected {
                tx_hash: approval_hash,
            });
        }
        info!("✅ Approval {} succeeded", approval_hash);

        // Swapping
        run.advance(SwapState::Swapping);
        let deadline = match self.swap_deadline() {
            Ok(deadline) => deadline,
            Err(source) => return run.fail(SwapFailure::Error(build_error(TxPhase::Swap, source))),
        };
        let swap = ContractCall::SwapExactTokensForTokens {
            router: self.deployment.swap_router,
            amount_in: quote.amount_in,
            amount_out_min: quote.amount_out_minimum,
            path: vec![request.token_in.address, request.token_out.address],
            to: request.recipient.unwrap_or(sender),
            deadline,
        };

        let tx = match self.builder.build(&swap, sender).await {
            Ok(tx) => tx,
            Err(source) => return run.fail(SwapFailure::Error(build_error(TxPhase::Swap, source))),
        };
        if tx.nonce <= approval_nonce {
            let stale = BuildError::StaleNonce {
                previous: approval_nonce,
                got: tx.nonce,
            };
            return run.fail(SwapFailure::Error(build_error(TxPhase::Swap, stale)));
        }

        let nonce = tx.nonce;
        let receipt = match submitter.submit(tx).await {
            Ok(receipt) => receipt,
            Err(source) => {
                return run.fail(SwapFailure::Error(SwapError::Submission {
                    phase: TxPhase::Swap,
                    source,
                }))
            }
        };
        run.advance(SwapState::AwaitingSwapReceipt);

        if receipt.is_success() {
            info!("✅ Swap {} succeeded", receipt.tx_hash);
        } else {
            warn!("⚠️  Swap {} reverted on-chain", receipt.tx_hash);
        }
        run.swap = Some(TransactionOutcome { nonce, receipt });

        run.advance(SwapState::Done);
        run
    }

    /// Submit `harvestAll(pids)`; a reverted harvest is returned, not raised
    pub async fn harvest(&self, request: &HarvestRequest) -> Result<TransactionOutcome, SwapError> {
        let submitter = self.submitter()?;
        self.verify_chain_id().await?;

        let call = ContractCall::HarvestAll {
            harvester: self.deployment.farm_harvester,
            pids: request.pids.iter().map(|pid| U256::from(*pid)).collect(),
        };
        let outcome = self
            .execute(submitter, &call, submitter.address(), TxPhase::Harvest)
            .await?;

        if outcome.receipt.is_success() {
            info!("✅ Harvest {} succeeded", outcome.receipt.tx_hash);
        } else {
            warn!("⚠️  Harvest {} reverted on-chain", outcome.receipt.tx_hash);
        }
        Ok(outcome)
    }

    /// The node must be on the chain the deployment was written for
    pub async fn verify_chain_id(&self) -> Result<(), SwapError> {
        let actual = self
            .client
            .chain_id()
            .await
            .map_err(ConfigError::ChainIdUnavailable)?;

        if actual != self.deployment.chain_id {
            return Err(ConfigError::ChainIdMismatch {
                expected: self.deployment.chain_id,
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Absolute swap expiry: now plus the deployment's deadline window
    fn swap_deadline(&self) -> Result<U256, BuildError> {
        let window_secs = self.deployment.swap_deadline_secs;
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        now.checked_add(window_secs)
            .map(U256::from)
            .ok_or(BuildError::DeadlineOverflow { window_secs })
    }

    fn submitter(&self) -> Result<&TransactionSubmitter, SwapError> {
        self.submitter
            .as_ref()
            .ok_or(SwapError::Configuration(ConfigError::MissingVar(PRIVATE_KEY_VAR)))
    }

    async fn execute(
        &self,
        submitter: &TransactionSubmitter,
        call: &ContractCall,
        sender: Address,
        phase: TxPhase,
    ) -> Result<TransactionOutcome, SwapError> {
        let tx = self
            .builder
            .build(call, sender)
            .await
            .map_err(|source| build_error(phase, source))?;

        let nonce = tx.nonce;
        let receipt = submitter
            .submit(tx)
            .await
            .map_err(|source| SwapError::Submission { phase, source })?;

        Ok(TransactionOutcome { nonce, receipt })
    }
}

fn build_error(phase: TxPhase, source: BuildError) -> SwapError {
    SwapError::Build { phase, source }
}
