//! Core type definitions for the AMM.
//!
//! Re-exports from alloy-primitives for Ethereum-compatible types.

pub use alloy::primitives::{address, Address, B256, U256};

/// Unique identifier for a token (contract address).
/// The zero address is never a valid token.
pub type TokenId = Address;

/// Amount of tokens or LP shares in the smallest unit, always full 256-bit width.
pub type Amount = U256;

/// LP shares locked forever on the first deposit into a pair.
pub const MINIMUM_LIQUIDITY: u64 = 1000;

/// Holder of the locked minimum liquidity. Nobody can spend from it.
pub const BURN_ADDRESS: Address = address!("0000000000000000000000000000000000000001");

/// `MINIMUM_LIQUIDITY` as an [`Amount`].
pub fn minimum_liquidity() -> Amount {
    U256::from(MINIMUM_LIQUIDITY)
}
