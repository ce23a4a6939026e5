//! Deployment configuration and credentials
//!
//! Static per-deployment values (chain id, gas defaults, contract addresses,
//! tokens) live in an immutable [`DeploymentConfig`] handed to every component.
//! Secrets come from the environment via [`Credentials`].

use alloy_primitives::{address, Address};
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use crate::chain::gwei_to_wei;
use crate::error::ConfigError;
use crate::executor::{parse_private_key, ContractRole};
use crate::pricing::MAX_DECIMALS;
use crate::tokens::{default_tokens, TokenDescriptor};

// ============================================
// ENVIRONMENT
// ============================================

pub const NODE_URL_VAR: &str = "SHIMMEREVM_NODE_URL";
pub const ACCOUNT_ADDRESS_VAR: &str = "SHIMMEREVM_ACCOUNT_ADDRESS";
pub const PRIVATE_KEY_VAR: &str = "SHIMMEREVM_PRIVATE_KEY";

// ============================================
// SHIMMERSEA DEFAULTS
// ============================================

pub const SHIMMER_CHAIN_ID: u64 = 148;
pub const SHIMMER_GAS_PRICE_GWEI: &str = "1000";
pub const SHIMMER_GAS_LIMIT: u64 = 800_000;

const PRICE_ORACLE: Address = address!("C0E5E2608E9779bFC14C0c632510E57982aFB63C");
const SWAP_ROUTER: Address = address!("3EdAFd0258F75E0F49d570B1b28a1F7A042bcEC3");
const FARM_HARVESTER: Address = address!("686eAd3Fee35C811684E6158408B49220d912dD4");

/// Longest accepted swap deadline window (one day)
const MAX_SWAP_DEADLINE_SECS: u64 = 24 * 60 * 60;

// ============================================
// DEPLOYMENT
// ============================================

/// Everything that is fixed per deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    // ========== Network Settings ==========
    /// Chain ID (148 = ShimmerEVM)
    pub chain_id: u64,

    /// Legacy gas price, in gwei
    pub gas_price_gwei: String,

    /// Gas limit for every transaction
    pub gas_limit: u64,

    /// How long to wait for a receipt before giving up
    pub receipt_timeout_secs: u64,

    /// Receipt polling interval
    pub receipt_poll_interval_ms: u64,

    // ========== Contracts ==========
    pub price_oracle: Address,

    /// Router; also the spender of every approval
    pub swap_router: Address,

    pub farm_harvester: Address,

    // ========== Swap Settings ==========
    /// Swap deadline, relative to submission time
    pub swap_deadline_secs: u64,

    // ========== Tokens ==========
    pub tokens: Vec<TokenDescriptor>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            chain_id: SHIMMER_CHAIN_ID,
            gas_price_gwei: SHIMMER_GAS_PRICE_GWEI.to_string(),
            gas_limit: SHIMMER_GAS_LIMIT,
            receipt_timeout_secs: 120,
            receipt_poll_interval_ms: 500,
            price_oracle: PRICE_ORACLE,
            swap_router: SWAP_ROUTER,
            farm_harvester: FARM_HARVESTER,
            swap_deadline_secs: 10 * 60,
            tokens: default_tokens(),
        }
    }
}

impl DeploymentConfig {
    /// Load a deployment from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject deployments the pipeline cannot run against
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidDeployment(reason));

        if self.chain_id == 0 {
            return invalid("chain_id must be non-zero".to_string());
        }
        if self.gas_limit == 0 {
            return invalid("gas_limit must be non-zero".to_string());
        }
        if let Err(e) = gwei_to_wei(&self.gas_price_gwei) {
            return invalid(e.to_string());
        }
        if self.receipt_timeout_secs == 0 {
            return invalid("receipt_timeout_secs must be non-zero".to_string());
        }
        if self.receipt_poll_interval_ms == 0 {
            return invalid("receipt_poll_interval_ms must be non-zero".to_string());
        }
        if self.swap_deadline_secs == 0 || self.swap_deadline_secs > MAX_SWAP_DEADLINE_SECS {
            return invalid(format!(
                "swap_deadline_secs must be between 1 and {}, got {}",
                MAX_SWAP_DEADLINE_SECS, self.swap_deadline_secs
            ));
        }

        for (name, addr) in [
            ("price_oracle", self.price_oracle),
            ("swap_router", self.swap_router),
            ("farm_harvester", self.farm_harvester),
        ] {
            if addr == Address::ZERO {
                return invalid(format!("{} address is zero", name));
            }
        }

        let mut symbols = HashSet::new();
        for token in &self.tokens {
            if !symbols.insert(token.symbol.to_uppercase()) {
                return invalid(format!("token {} listed twice", token.symbol));
            }
            if token.decimals > MAX_DECIMALS {
                return invalid(format!(
                    "token {} has {} decimals (max {})",
                    token.symbol, token.decimals, MAX_DECIMALS
                ));
            }
            if token.address == Address::ZERO {
                return invalid(format!("token {} address is zero", token.symbol));
            }
        }

        Ok(())
    }

    /// Look a token up by symbol (case-insensitive)
    pub fn token(&self, symbol: &str) -> Result<&TokenDescriptor, ConfigError> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| ConfigError::UnknownToken(symbol.to_string()))
    }

    /// Role of the contract deployed at `address`, if it is one of ours
    pub fn contract_role(&self, address: Address) -> Option<ContractRole> {
        if address == self.swap_router {
            Some(ContractRole::SwapRouter)
        } else if address == self.price_oracle {
            Some(ContractRole::PriceOracle)
        } else if address == self.farm_harvester {
            Some(ContractRole::FarmHarvester)
        } else if self.tokens.iter().any(|t| t.address == address) {
            Some(ContractRole::Token)
        } else {
            None
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              SHIMMER SWAP - DEPLOYMENT                     ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Chain ID:          {:^40} ║", self.chain_id);
        println!("║ Gas Price:         {:^40} ║", format!("{} gwei", self.gas_price_gwei));
        println!("║ Gas Limit:         {:^40} ║", self.gas_limit);
        println!("║ Swap Deadline:     {:^40} ║", format!("{}s", self.swap_deadline_secs));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ CONTRACTS                                                  ║");
        println!("║ • Oracle:   {:<46} ║", format!("{:?}", self.price_oracle));
        println!("║ • Router:   {:<46} ║", format!("{:?}", self.swap_router));
        println!("║ • Farm:     {:<46} ║", format!("{:?}", self.farm_harvester));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ TOKENS                                                     ║");
        for token in &self.tokens {
            println!(
                "║ • {:<6} {:<42} {:>3}d ║",
                token.symbol,
                format!("{:?}", token.address),
                token.decimals
            );
        }
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

// ============================================
// CREDENTIALS
// ============================================

/// Node endpoint, account and signing key
pub struct Credentials {
    pub node_url: String,
    pub account: Address,
    pub signer: PrivateKeySigner,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("node_url", &self.node_url)
            .field("account", &self.account)
            .field("signer", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from environment variables and .env file
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let node_url = Self::node_url_from_env()?;
        let account_raw = required_var(ACCOUNT_ADDRESS_VAR)?;
        let key = required_var(PRIVATE_KEY_VAR)?;

        let account = account_raw
            .trim()
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidValue {
                name: ACCOUNT_ADDRESS_VAR,
                reason: e.to_string(),
            })?;

        let signer = parse_private_key(&key).map_err(|reason| ConfigError::InvalidValue {
            name: PRIVATE_KEY_VAR,
            reason,
        })?;

        Self::new(node_url, account, signer)
    }

    /// Only the node endpoint; enough for read-only runs
    pub fn node_url_from_env() -> Result<String, ConfigError> {
        dotenvy::dotenv().ok();

        let url = required_var(NODE_URL_VAR)?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: NODE_URL_VAR,
                reason: format!("expected an http(s) url, got {:?}", url),
            });
        }
        Ok(url)
    }

    /// The key must belong to the account it is used for
    pub fn new(
        node_url: String,
        account: Address,
        signer: PrivateKeySigner,
    ) -> Result<Self, ConfigError> {
        if signer.address() != account {
            return Err(ConfigError::AccountMismatch {
                account,
                signer: signer.address(),
            });
        }
        Ok(Self {
            node_url,
            account,
            signer,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

// ============================================
// TESTS
// ============================================
