//! Shimmer Swap - Oracle-priced swaps on ShimmerSea (ShimmerEVM)
//!
//! Run with: cargo run -- quote --from LUM --to SMR --amount 0.00001 --slippage-bps 200
//!
//! Subcommands:
//! - quote:   oracle prices and a slippage-bounded quote, sends nothing
//! - swap:    approve the router, then swap (stops if the approval is rejected)
//! - harvest: harvest farm rewards for a list of pool ids

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chain;
mod config;
mod error;
mod executor;
mod oracle;
mod orchestrator;
mod pricing;
mod tokens;

use chain::{ChainClient, RpcChainClient};
use config::{Credentials, DeploymentConfig};
use orchestrator::{
    HarvestRequest, QuoteReport, QuoteRequest, SwapFailure, SwapOrchestrator, SwapRequest,
    SwapState,
};
use pricing::{HumanAmount, SlippageTolerance};

// -------
// | Cli |
// -------

#[derive(Parser)]
#[command(name = "shimmer-swap")]
#[command(about = "Oracle-priced ERC-20 swaps on ShimmerSea")]
struct Cli {
    /// Deployment file (TOML); the ShimmerSea mainnet deployment when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a swap from oracle prices without sending anything
    Quote {
        #[command(flatten)]
        trade: TradeArgs,
    },
    /// Approve the router for the input amount, then swap
    Swap {
        #[command(flatten)]
        trade: TradeArgs,
        /// Receiver of the output tokens (defaults to the sending account)
        #[arg(long)]
        recipient: Option<Address>,
    },
    /// Harvest farm rewards
    Harvest {
        /// Pool ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        pids: Vec<u64>,
    },
}

#[derive(clap::Args)]
struct TradeArgs {
    /// Input token symbol
    #[arg(long)]
    from: String,
    /// Output token symbol
    #[arg(long)]
    to: String,
    /// Input amount in whole tokens, e.g. 0.00001
    #[arg(long)]
    amount: HumanAmount,
    /// Slippage tolerance in basis points (200 = 2%)
    #[arg(long)]
    slippage_bps: u16,
}

impl TradeArgs {
    fn quote_request(&self, deployment: &DeploymentConfig) -> Result<QuoteRequest> {
        Ok(QuoteRequest {
            token_in: deployment.token(&self.from)?.clone(),
            token_out: deployment.token(&self.to)?.clone(),
            amount_in: self.amount,
            slippage: SlippageTolerance::from_bps(self.slippage_bps)?,
        })
    }
}

// --------------
// | Helpers    |
// --------------

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🌊 SHIMMER SWAP - ShimmerSea Swap Executor").cyan().bold()
    );
    println!(
        "{}",
        style("    Oracle Quotes | Approve → Swap | Farm Harvest").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn load_deployment(path: Option<&PathBuf>) -> Result<DeploymentConfig> {
    let deployment = match path {
        Some(path) => {
            info!("Loading deployment from {}", path.display());
            DeploymentConfig::from_file(path)?
        }
        None => DeploymentConfig::default(),
    };
    deployment.validate()?;
    Ok(deployment)
}

fn print_quote(request: &QuoteRequest, report: &QuoteReport) {
    println!("{}", style("═══ QUOTE ═══").blue().bold());
    println!(
        "   {} price: {}",
        request.token_in.symbol, report.price_in
    );
    println!(
        "   {} price: {}",
        request.token_out.symbol, report.price_out
    );
    println!(
        "   {} {} ≈ {} {}",
        request.amount_in, request.token_in.symbol, report.amount_out, request.token_out.symbol
    );
    println!("   Amount in:      {} (base units)", report.quote.amount_in);
    println!("   Estimated out:  {} (base units)", report.quote.amount_out_estimate);
    println!(
        "   Minimum out:    {} (base units, {} slippage)",
        report.quote.amount_out_minimum, request.slippage
    );
    println!();
}

// --------------
// | Entrypoint |
// --------------

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shimmer_swap=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    print_banner();

    let deployment = load_deployment(cli.config.as_ref())?;
    deployment.print_summary();
    println!();

    match cli.command {
        Commands::Quote { trade } => {
            let node_url = Credentials::node_url_from_env()?;
            let client: Arc<dyn ChainClient> =
                Arc::new(RpcChainClient::for_deployment(node_url, &deployment));

            let request = trade.quote_request(&deployment)?;
            let orchestrator = SwapOrchestrator::new(client, deployment);
            let report = orchestrator.quote(&request).await?;
            print_quote(&request, &report);
        }

        Commands::Swap { trade, recipient } => {
            let credentials = Credentials::from_env()?;
            info!("Account: {:?}", credentials.account);

            let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::for_deployment(
                credentials.node_url.clone(),
                &deployment,
            ));

            let quote = trade.quote_request(&deployment)?;
            let request = SwapRequest {
                token_in: quote.token_in.clone(),
                token_out: quote.token_out.clone(),
                amount_in: quote.amount_in,
                slippage: quote.slippage,
                recipient,
            };

            let orchestrator =
                SwapOrchestrator::new(client, deployment).with_signer(credentials.signer);
            let run = orchestrator.swap(request).await;

            if let Some(report) = &run.quote {
                print_quote(&quote, report);
            }

            println!("{}", style("═══ TRANSACTIONS ═══").blue().bold());
            for (label, outcome) in [("Approval", &run.approval), ("Swap", &run.swap)] {
                if let Some(outcome) = outcome {
                    println!(
                        "   {:<9} {:?} nonce={} status={:?} block={:?} gas={}",
                        label,
                        outcome.receipt.tx_hash,
                        outcome.nonce,
                        outcome.receipt.status,
                        outcome.receipt.block_number,
                        outcome.receipt.gas_used
                    );
                }
            }
            let path: Vec<String> = run.history().iter().map(|s| s.to_string()).collect();
            println!("   Path:     {}", path.join(" → "));
            println!("   Mined:    {} transaction(s)", run.receipts().len());
            println!();

            match (run.state(), run.failure()) {
                (SwapState::Done, _) => {
                    let swapped = run.swap.as_ref().is_some_and(|s| s.receipt.is_success());
                    if swapped {
                        println!("{} Swap completed", style("✓").green());
                    } else {
                        println!("{} Swap mined but reverted", style("✗").yellow());
                    }
                }
                (_, Some(failure)) => {
                    if let SwapFailure::Error(err) = failure {
                        if let Some(phase) = err.phase() {
                            error!("Failed during the {} transaction", phase);
                        }
                    }
                    if let Some(hash) = failure.tx_hash() {
                        error!("Last transaction: {:?}", hash);
                    }
                    return Err(eyre!("swap failed: {}", failure));
                }
                (state, None) => return Err(eyre!("swap stopped in state {}", state)),
            }
        }

        Commands::Harvest { pids } => {
            let credentials = Credentials::from_env()?;
            let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::for_deployment(
                credentials.node_url.clone(),
                &deployment,
            ));

            let orchestrator =
                SwapOrchestrator::new(client, deployment).with_signer(credentials.signer);
            let outcome = orchestrator.harvest(&HarvestRequest { pids }).await?;

            println!(
                "{} Harvest {:?}: status={:?} block={:?}",
                if outcome.receipt.is_success() {
                    style("✓").green()
                } else {
                    style("✗").yellow()
                },
                outcome.receipt.tx_hash,
                outcome.receipt.status,
                outcome.receipt.block_number
            );
        }
    }

    Ok(())
}
