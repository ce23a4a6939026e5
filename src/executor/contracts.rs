//! Contract interfaces and typed contract calls
//!
//! Each deployed contract plays one [`ContractRole`]; a role carries the static
//! function schema of its ABI. A [`ContractCall`] is a typed call value, checked
//! against the schema of whatever the deployment has registered at its target
//! address before a transaction is ever built.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

// ============================================
// SOLIDITY INTERFACES
// ============================================

sol! {
    /// ERC-20 token (LUM, wrapped SMR)
    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    /// ShimmerSea router (UniswapV2-style)
    #[derive(Debug)]
    interface IShimmerSeaRouter {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);
    }

    /// ShimmerSea price getter
    #[derive(Debug)]
    interface IPriceOracle {
        function getPrice(address token, uint256 decimals) external view returns (uint256);
    }

    /// ShimmerSea farm (MasterChef-style)
    #[derive(Debug)]
    interface IFarmHarvester {
        function harvestAll(uint256[] calldata pids) external;
    }
}

// ============================================
// FUNCTION SCHEMAS
// ============================================

/// One entry of a contract's ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub selector: [u8; 4],
}

const ERC20_FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec { name: "approve", selector: IERC20::approveCall::SELECTOR },
    FunctionSpec { name: "allowance", selector: IERC20::allowanceCall::SELECTOR },
    FunctionSpec { name: "balanceOf", selector: IERC20::balanceOfCall::SELECTOR },
];

const ROUTER_FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "swapExactTokensForTokens",
        selector: IShimmerSeaRouter::swapExactTokensForTokensCall::SELECTOR,
    },
    FunctionSpec {
        name: "getAmountsOut",
        selector: IShimmerSeaRouter::getAmountsOutCall::SELECTOR,
    },
];

const ORACLE_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "getPrice",
    selector: IPriceOracle::getPriceCall::SELECTOR,
}];

const HARVESTER_FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "harvestAll",
    selector: IFarmHarvester::harvestAllCall::SELECTOR,
}];

/// What a deployed contract is, and therefore which functions it has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractRole {
    Token,
    SwapRouter,
    PriceOracle,
    FarmHarvester,
}

impl ContractRole {
    pub fn name(&self) -> &'static str {
        match self {
            ContractRole::Token => "ERC20",
            ContractRole::SwapRouter => "ShimmerSeaRouter",
            ContractRole::PriceOracle => "PriceOracle",
            ContractRole::FarmHarvester => "FarmHarvester",
        }
    }

    pub fn functions(&self) -> &'static [FunctionSpec] {
        match self {
            ContractRole::Token => ERC20_FUNCTIONS,
            ContractRole::SwapRouter => ROUTER_FUNCTIONS,
            ContractRole::PriceOracle => ORACLE_FUNCTIONS,
            ContractRole::FarmHarvester => HARVESTER_FUNCTIONS,
        }
    }

    /// Find a function by name and selector
    pub fn find(&self, name: &str, selector: [u8; 4]) -> Option<&'static FunctionSpec> {
        self.functions()
            .iter()
            .find(|f| f.name == name && f.selector == selector)
    }
}

impl std::fmt::Display for ContractRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================
// CONTRACT CALLS
// ============================================

/// A state-changing call, typed per function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `token.approve(spender, amount)`
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },

    /// `router.swapExactTokensForTokens(...)`
    SwapExactTokensForTokens {
        router: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },

    /// `harvester.harvestAll(pids)`
    HarvestAll { harvester: Address, pids: Vec<U256> },
}

impl ContractCall {
    /// Contract the call is sent to
    pub fn target(&self) -> Address {
        match self {
            ContractCall::Approve { token, .. } => *token,
            ContractCall::SwapExactTokensForTokens { router, .. } => *router,
            ContractCall::HarvestAll { harvester, .. } => *harvester,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::Approve { .. } => "approve",
            ContractCall::SwapExactTokensForTokens { .. } => "swapExactTokensForTokens",
            ContractCall::HarvestAll { .. } => "harvestAll",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            ContractCall::Approve { .. } => IERC20::approveCall::SELECTOR,
            ContractCall::SwapExactTokensForTokens { .. } => {
                IShimmerSeaRouter::swapExactTokensForTokensCall::SELECTOR
            }
            ContractCall::HarvestAll { .. } => IFarmHarvester::harvestAllCall::SELECTOR,
        }
    }

    /// ABI-encoded calldata, selector included
    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            ContractCall::Approve {
                spender, amount, ..
            } => IERC20::approveCall {
                spender: *spender,
                amount: *amount,
            }
            .abi_encode(),
            ContractCall::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
                ..
            } => IShimmerSeaRouter::swapExactTokensForTokensCall {
                amountIn: *amount_in,
                amountOutMin: *amount_out_min,
                path: path.clone(),
                to: *to,
                deadline: *deadline,
            }
            .abi_encode(),
            ContractCall::HarvestAll { pids, .. } => {
                IFarmHarvester::harvestAllCall { pids: pids.clone() }.abi_encode()
            }
        };
        Bytes::from(encoded)
    }
}
