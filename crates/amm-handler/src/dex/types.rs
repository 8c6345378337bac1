//! Type definitions for router calls.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol_data, SolType, SolValue};
use amm::AmmError;

/// Result of a router call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexResult {
    PairCreated {
        token0: Address,
        token1: Address,
        pair: Address,
    },
    /// `getPair` answer; the zero address when no pair exists.
    Pair {
        pair: Address,
    },
    FeeToUpdated {
        fee_to: Address,
    },
    FeeToSetterUpdated {
        fee_to_setter: Address,
    },
    LiquidityAdded {
        pair: Address,
        amount_a: U256,
        amount_b: U256,
        liquidity: U256,
    },
    LiquidityRemoved {
        amount_a: U256,
        amount_b: U256,
    },
    SwapExecuted {
        trader: Address,
        path: Vec<Address>,
        /// Input of every hop followed by the final output.
        amounts: Vec<U256>,
    },
    Reserves {
        reserve0: U256,
        reserve1: U256,
    },
    BestPool {
        amount_out: U256,
    },
    /// Bridge indices in reverse hop order.
    PathResults {
        path_len: u8,
        path: Vec<u8>,
    },
    SortedTokens {
        token0: Address,
        token1: Address,
    },
}

impl DexResult {
    /// ABI-encoded return data of the call that produced this result.
    pub fn encode_output(&self) -> Bytes {
        let data = match self {
            DexResult::PairCreated { pair, .. } | DexResult::Pair { pair } => {
                (*pair,).abi_encode_params()
            }
            DexResult::FeeToUpdated { .. } | DexResult::FeeToSetterUpdated { .. } => Vec::new(),
            DexResult::LiquidityAdded {
                amount_a,
                amount_b,
                liquidity,
                ..
            } => (*amount_a, *amount_b, *liquidity).abi_encode_params(),
            DexResult::LiquidityRemoved { amount_a, amount_b } => {
                (*amount_a, *amount_b).abi_encode_params()
            }
            DexResult::SwapExecuted { amounts, .. } => (amounts.clone(),).abi_encode_params(),
            DexResult::Reserves { reserve0, reserve1 } => {
                (*reserve0, *reserve1).abi_encode_params()
            }
            DexResult::BestPool { amount_out } => (*amount_out,).abi_encode_params(),
            DexResult::PathResults { path_len, path } => {
                <(sol_data::Uint<8>, sol_data::Array<sol_data::Uint<8>>)>::abi_encode_params(&(
                    *path_len,
                    path.clone(),
                ))
            }
            DexResult::SortedTokens { token0, token1 } => (*token0, *token1).abi_encode_params(),
        };
        data.into()
    }
}

/// Errors that can occur while handling a router call.
#[derive(Debug, thiserror::Error)]
pub enum DexError {
    #[error("Invalid calldata: {0}")]
    InvalidCalldata(String),

    #[error("Unknown pair: {0}")]
    UnknownPair(Address),

    #[error("AMM error: {0}")]
    Amm(#[from] AmmError),
}
