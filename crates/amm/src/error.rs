//! Error taxonomy shared by every AMM operation.

use crate::types::{Address, Amount, TokenId};

/// Errors that can occur in the exchange engine.
///
/// Any error aborts the whole enclosing operation; nothing it staged is
/// committed. `Overflow` and `InvariantViolation` are fatal and never
/// clamped. All other kinds are user errors fixable by resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    /// The deadline is not strictly after the current block timestamp.
    #[error("transaction expired: deadline {deadline} is not after {now}")]
    Expired { deadline: u64, now: u64 },

    /// A token argument is the zero address.
    #[error("invalid token address")]
    InvalidTokenAddress,

    /// Both sides of a pair are the same token.
    #[error("identical tokens: {0}")]
    IdenticalTokens(TokenId),

    /// A pair for this unordered token key already exists.
    #[error("pair already exists: {token0}/{token1}")]
    PairAlreadyExists { token0: TokenId, token1: TokenId },

    /// No pair is registered for the token key or address.
    #[error("pair not found: {token_a}/{token_b}")]
    PairNotFound { token_a: TokenId, token_b: TokenId },

    /// Reserves or share balance cannot cover the request.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Realised amount fell below the caller's minimum.
    #[error("slippage exceeded: got {actual}, minimum {minimum}")]
    SlippageExceeded { actual: Amount, minimum: Amount },

    /// Required input is above the caller's maximum.
    #[error("excessive input amount: need {required}, maximum {maximum}")]
    ExcessiveInputAmount { required: Amount, maximum: Amount },

    /// Caller is not the fee-to setter.
    #[error("unauthorized caller: {0}")]
    Unauthorized(Address),

    /// Zero or burn address where a real account is required.
    #[error("invalid address")]
    InvalidAddress,

    /// Checked 256-bit arithmetic overflowed.
    #[error("arithmetic overflow")]
    Overflow,

    /// The constant-product check failed after a swap.
    #[error("constant-product invariant violated")]
    InvariantViolation,

    /// Swap path shorter than two tokens or with a degenerate hop.
    #[error("invalid swap path")]
    InvalidPath,

    #[error("insufficient input amount")]
    InsufficientInputAmount,

    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    /// Token balance too small for a transfer.
    #[error("insufficient balance of {token} for {account}")]
    InsufficientBalance { token: TokenId, account: Address },

    /// Spender allowance too small for a transfer.
    #[error("insufficient allowance of {token} from {owner} to {spender}")]
    InsufficientAllowance {
        token: TokenId,
        owner: Address,
        spender: Address,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl AmmError {
    /// Fatal errors indicate a broken ledger rather than a bad request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AmmError::Overflow | AmmError::InvariantViolation)
    }
}
