//! Pair engine: one pool's reserve ledger and constant-product math.

use crate::config::AmmConfig;
use crate::error::AmmError;
use crate::math::{self, add, div, mul, sub};
use crate::types::{minimum_liquidity, Address, Amount, TokenId, BURN_ADDRESS, U256};
use alloy::primitives::keccak256;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Unique identifier for a pair.
/// This is deterministically generated from the two token IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(pub [u8; 32]);

impl PairId {
    /// Create a PairId from two tokens.
    /// The pair ID is the same regardless of token order.
    pub fn from_tokens(token_a: TokenId, token_b: TokenId) -> Self {
        // Sort tokens to ensure deterministic pair ID regardless of order
        let (first, second) = if token_a <= token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };

        // Hash the concatenated addresses
        let mut data = [0u8; 40];
        data[..20].copy_from_slice(first.as_slice());
        data[20..].copy_from_slice(second.as_slice());
        let hash = keccak256(data);
        Self(hash.0)
    }

    /// The pair's address: the low 20 bytes of the id.
    pub fn address(&self) -> Address {
        Address::from_slice(&self.0[12..])
    }
}

/// Canonical ordering of two tokens by numeric address value.
pub fn sort_tokens(token_a: TokenId, token_b: TokenId) -> Result<(TokenId, TokenId), AmmError> {
    if token_a.is_zero() || token_b.is_zero() {
        return Err(AmmError::InvalidTokenAddress);
    }
    if token_a == token_b {
        return Err(AmmError::IdenticalTokens(token_a));
    }
    Ok(if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    })
}

/// A constant-product pool for one unordered token pair.
///
/// The pair is also the ledger of its own LP shares. Token balances live in
/// the external [`TokenLedger`](crate::ledger::TokenLedger) under
/// [`Pair::address`]; the router keeps them equal to the reserves.
#[derive(Debug, Clone)]
pub struct Pair {
    id: PairId,
    token0: TokenId,
    token1: TokenId,
    reserve0: Amount,
    reserve1: Amount,
    total_supply: Amount,
    k_last: Amount,
    shares: HashMap<Address, Amount>,
}

impl Pair {
    /// Create an empty pair. Tokens may be given in either order.
    pub fn new(token_a: TokenId, token_b: TokenId) -> Result<Self, AmmError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        Ok(Self {
            id: PairId::from_tokens(token0, token1),
            token0,
            token1,
            reserve0: U256::ZERO,
            reserve1: U256::ZERO,
            total_supply: U256::ZERO,
            k_last: U256::ZERO,
            shares: HashMap::new(),
        })
    }

    pub fn id(&self) -> PairId {
        self.id
    }

    pub fn address(&self) -> Address {
        self.id.address()
    }

    pub fn token0(&self) -> TokenId {
        self.token0
    }

    pub fn token1(&self) -> TokenId {
        self.token1
    }

    /// Current reserves as `(reserve0, reserve1)`. No side effects.
    pub fn get_reserves(&self) -> (Amount, Amount) {
        (self.reserve0, self.reserve1)
    }

    /// Reserves oriented for a trade selling `token_in`: `(reserve_in, reserve_out)`.
    pub fn reserves_for(&self, token_in: TokenId) -> Result<(Amount, Amount), AmmError> {
        if token_in == self.token0 {
            Ok((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Ok((self.reserve1, self.reserve0))
        } else {
            Err(AmmError::InvalidPath)
        }
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// `reserve0 * reserve1` as of the last liquidity event while fees were on.
    pub fn k_last(&self) -> Amount {
        self.k_last
    }

    /// LP shares held by `holder`.
    pub fn balance_of(&self, holder: Address) -> Amount {
        self.shares.get(&holder).copied().unwrap_or(U256::ZERO)
    }

    /// Check if this pair contains the given token.
    pub fn contains(&self, token: TokenId) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// Get the other token in the pair.
    pub fn other_token(&self, token: TokenId) -> Option<TokenId> {
        if self.token0 == token {
            Some(self.token1)
        } else if self.token1 == token {
            Some(self.token0)
        } else {
            None
        }
    }

    /// Read-only exact-input quote against the current reserves.
    pub fn quote_out(
        &self,
        amount_in: Amount,
        token_in: TokenId,
        config: &AmmConfig,
    ) -> Result<Amount, AmmError> {
        let (reserve_in, reserve_out) = self.reserves_for(token_in)?;
        math::get_amount_out(amount_in, reserve_in, reserve_out, config)
    }

    /// Shares owed to the protocol for the growth of `sqrt(k)` since `k_last`.
    ///
    /// `total_supply * (sqrt(k) - sqrt(k_last)) / (5 * sqrt(k) + sqrt(k_last))`,
    /// about one sixth of the accrued trading fee.
    fn protocol_fee_shares(&self, fee_on: bool) -> Result<Amount, AmmError> {
        if !fee_on || self.k_last.is_zero() {
            return Ok(U256::ZERO);
        }
        let root_k = math::sqrt(mul(self.reserve0, self.reserve1)?);
        let root_k_last = math::sqrt(self.k_last);
        if root_k <= root_k_last {
            return Ok(U256::ZERO);
        }
        let numerator = mul(self.total_supply, sub(root_k, root_k_last)?)?;
        let denominator = add(mul(root_k, U256::from(5))?, root_k_last)?;
        div(numerator, denominator)
    }

    /// Mint the protocol's share of accrued fees to `fee_to`.
    ///
    /// Mint and burn do this implicitly. With fees off it only clears a stale
    /// `k_last`. Returns the shares minted.
    pub fn collect_protocol_fee(&mut self, fee_to: Option<Address>) -> Result<Amount, AmmError> {
        let fee_to = fee_to.filter(|a| !a.is_zero());
        let fee_shares = self.protocol_fee_shares(fee_to.is_some())?;
        match fee_to {
            Some(recipient) => {
                let k = mul(self.reserve0, self.reserve1)?;
                self.credit_fee(recipient, fee_shares)?;
                self.k_last = k;
            }
            None => self.k_last = U256::ZERO,
        }
        Ok(fee_shares)
    }

    fn credit_fee(&mut self, fee_to: Address, fee_shares: Amount) -> Result<(), AmmError> {
        if fee_shares.is_zero() {
            return Ok(());
        }
        self.total_supply = add(self.total_supply, fee_shares)?;
        self.credit(fee_to, fee_shares)?;
        debug!(pair = %self.address(), %fee_to, %fee_shares, "protocol fee minted");
        Ok(())
    }

    fn credit(&mut self, holder: Address, amount: Amount) -> Result<(), AmmError> {
        let balance = self.shares.entry(holder).or_insert(U256::ZERO);
        *balance = add(*balance, amount)?;
        Ok(())
    }

    /// Deposit `amount0`/`amount1` (already transferred to the pair) and mint
    /// LP shares to `to`.
    ///
    /// The first deposit mints `sqrt(amount0 * amount1) - MINIMUM_LIQUIDITY`
    /// and locks `MINIMUM_LIQUIDITY` to the burn address. Later deposits mint
    /// the smaller of the two proportional claims. Nothing changes on error.
    pub fn mint(
        &mut self,
        amount0: Amount,
        amount1: Amount,
        to: Address,
        fee_to: Option<Address>,
    ) -> Result<Amount, AmmError> {
        let fee_to = fee_to.filter(|a| !a.is_zero());
        let fee_shares = self.protocol_fee_shares(fee_to.is_some())?;
        let total_supply = add(self.total_supply, fee_shares)?;

        let first_deposit = total_supply.is_zero();
        let liquidity = if first_deposit {
            let root = math::sqrt(mul(amount0, amount1)?);
            if root <= minimum_liquidity() {
                return Err(AmmError::InsufficientLiquidity);
            }
            root - minimum_liquidity()
        } else {
            if self.reserve0.is_zero() || self.reserve1.is_zero() {
                return Err(AmmError::InsufficientLiquidity);
            }
            let share0 = div(mul(amount0, total_supply)?, self.reserve0)?;
            let share1 = div(mul(amount1, total_supply)?, self.reserve1)?;
            share0.min(share1)
        };
        if liquidity.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let reserve0 = add(self.reserve0, amount0)?;
        let reserve1 = add(self.reserve1, amount1)?;
        let k = if fee_to.is_some() {
            mul(reserve0, reserve1)?
        } else {
            U256::ZERO
        };
        let mut new_supply = add(total_supply, liquidity)?;
        if first_deposit {
            new_supply = add(new_supply, minimum_liquidity())?;
        }

        if let Some(recipient) = fee_to {
            self.credit_fee(recipient, fee_shares)?;
        }
        if first_deposit {
            self.credit(BURN_ADDRESS, minimum_liquidity())?;
        }
        self.credit(to, liquidity)?;
        self.total_supply = new_supply;
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        self.k_last = k;

        debug!(
            pair = %self.address(),
            %amount0,
            %amount1,
            %liquidity,
            %to,
            "mint"
        );
        Ok(liquidity)
    }

    /// Redeem `shares` held by `owner` for a pro-rata slice of both reserves.
    ///
    /// Returns `(amount0, amount1)`, which the caller pays out of the pair's
    /// token balances. Nothing changes on error.
    pub fn burn(
        &mut self,
        owner: Address,
        shares: Amount,
        fee_to: Option<Address>,
    ) -> Result<(Amount, Amount), AmmError> {
        // Locked minimum liquidity is never spendable.
        let balance = if owner == BURN_ADDRESS {
            U256::ZERO
        } else {
            self.balance_of(owner)
        };
        if shares > balance {
            return Err(AmmError::InsufficientLiquidity);
        }

        let fee_to = fee_to.filter(|a| !a.is_zero());
        let fee_shares = self.protocol_fee_shares(fee_to.is_some())?;
        let total_supply = add(self.total_supply, fee_shares)?;
        if total_supply.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amount0 = div(mul(shares, self.reserve0)?, total_supply)?;
        let amount1 = div(mul(shares, self.reserve1)?, total_supply)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let reserve0 = sub(self.reserve0, amount0)?;
        let reserve1 = sub(self.reserve1, amount1)?;
        let k = if fee_to.is_some() {
            mul(reserve0, reserve1)?
        } else {
            U256::ZERO
        };

        if let Some(recipient) = fee_to {
            self.credit_fee(recipient, fee_shares)?;
        }
        // Re-read: the owner may be the fee recipient credited above.
        let remaining = sub(self.balance_of(owner), shares)?;
        self.shares.insert(owner, remaining);
        self.total_supply = sub(self.total_supply, shares)?;
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
        self.k_last = k;

        debug!(
            pair = %self.address(),
            %owner,
            %shares,
            %amount0,
            %amount1,
            "burn"
        );
        Ok((amount0, amount1))
    }

    /// Sell exactly `amount_in` of `token_in`; returns the amount of the other
    /// token the pair releases.
    pub fn swap(
        &mut self,
        amount_in: Amount,
        token_in: TokenId,
        config: &AmmConfig,
    ) -> Result<Amount, AmmError> {
        let amount_out = self.quote_out(amount_in, token_in, config)?;
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        self.swap_exact(amount_in, amount_out, token_in, config)?;
        Ok(amount_out)
    }

    /// Low-level swap with both legs given by the caller.
    ///
    /// The pair does not trust the amounts: the fee-adjusted post-swap
    /// balances must satisfy `adj0 * adj1 >= reserve0 * reserve1 * 10000^2`,
    /// otherwise the swap fails with [`AmmError::InvariantViolation`].
    pub fn swap_exact(
        &mut self,
        amount_in: Amount,
        amount_out: Amount,
        token_in: TokenId,
        config: &AmmConfig,
    ) -> Result<(), AmmError> {
        if amount_in.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        if amount_out.is_zero() {
            return Err(AmmError::InsufficientOutputAmount);
        }
        let (amount0_in, amount1_in, amount0_out, amount1_out) = if token_in == self.token0 {
            (amount_in, U256::ZERO, U256::ZERO, amount_out)
        } else if token_in == self.token1 {
            (U256::ZERO, amount_in, amount_out, U256::ZERO)
        } else {
            return Err(AmmError::InvalidPath);
        };
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(AmmError::InsufficientLiquidity);
        }

        let balance0 = sub(add(self.reserve0, amount0_in)?, amount0_out)?;
        let balance1 = sub(add(self.reserve1, amount1_in)?, amount1_out)?;

        let scale = config.fee_denominator();
        let fee = U256::from(config.fee_bps);
        let adjusted0 = sub(mul(balance0, scale)?, mul(amount0_in, fee)?)?;
        let adjusted1 = sub(mul(balance1, scale)?, mul(amount1_in, fee)?)?;
        let k_after = mul(adjusted0, adjusted1)?;
        let k_before = mul(mul(self.reserve0, self.reserve1)?, mul(scale, scale)?)?;
        if k_after < k_before {
            return Err(AmmError::InvariantViolation);
        }

        self.reserve0 = balance0;
        self.reserve1 = balance1;

        debug!(
            pair = %self.address(),
            %token_in,
            %amount_in,
            %amount_out,
            "swap"
        );
        Ok(())
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_a() -> TokenId {
        Address::repeat_byte(0x01)
    }

    fn token_b() -> TokenId {
        Address::repeat_byte(0x02)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xAA)
    }

    fn fee_to() -> Address {
        Address::repeat_byte(0xFE)
    }

    fn e18(v: u64) -> U256 {
        U256::from(v) * U256::from(10u64.pow(18))
    }

    fn funded_pair(amount0: U256, amount1: U256, fee_to: Option<Address>) -> Pair {
        let mut pair = Pair::new(token_a(), token_b()).unwrap();
        pair.mint(amount0, amount1, alice(), fee_to).unwrap();
        pair
    }

    #[test]
    fn test_pair_id_deterministic() {
        assert_eq!(
            PairId::from_tokens(token_a(), token_b()),
            PairId::from_tokens(token_b(), token_a())
        );
        let pair1 = Pair::new(token_a(), token_b()).unwrap();
        let pair2 = Pair::new(token_b(), token_a()).unwrap();
        assert_eq!(pair1.address(), pair2.address());
        assert_eq!(pair2.token0(), token_a());
        assert_eq!(pair2.token1(), token_b());
    }

    #[test]
    fn test_sort_tokens() {
        assert_eq!(sort_tokens(token_b(), token_a()).unwrap(), (token_a(), token_b()));
        assert_eq!(
            sort_tokens(token_a(), token_a()),
            Err(AmmError::IdenticalTokens(token_a()))
        );
        assert_eq!(
            sort_tokens(Address::ZERO, token_a()),
            Err(AmmError::InvalidTokenAddress)
        );
    }

    #[test]
    fn test_first_mint_locks_minimum_liquidity() {
        let pair = funded_pair(e18(11), e18(23), None);

        let (r0, r1) = pair.get_reserves();
        let ts = pair.total_supply();
        assert!(ts * ts <= r0 * r1);
        assert!((ts + U256::from(1)) * (ts + U256::from(1)) > r0 * r1);
        assert_eq!(pair.balance_of(BURN_ADDRESS), minimum_liquidity());
        assert_eq!(pair.balance_of(alice()) + minimum_liquidity(), ts);
    }

    #[test]
    fn test_first_mint_too_small() {
        let mut pair = Pair::new(token_a(), token_b()).unwrap();
        // sqrt(1000 * 1000) == MINIMUM_LIQUIDITY leaves nothing to mint
        assert_eq!(
            pair.mint(U256::from(1000), U256::from(1000), alice(), None),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(pair.total_supply(), U256::ZERO);
        assert_eq!(pair.get_reserves(), (U256::ZERO, U256::ZERO));
    }

    #[test]
    fn test_subsequent_mint_is_proportional() {
        let mut pair = funded_pair(e18(10), e18(40), None);
        let ts = pair.total_supply();

        let minted = pair.mint(e18(5), e18(20), alice(), None).unwrap();
        assert_eq!(minted, ts / U256::from(2));

        // The binding side decides
        let ts = pair.total_supply();
        let (r0, _) = pair.get_reserves();
        let minted = pair.mint(e18(3), e18(100), alice(), None).unwrap();
        assert_eq!(minted, e18(3) * ts / r0);
    }

    #[test]
    fn test_burn_pro_rata() {
        let mut pair = funded_pair(e18(10), e18(40), None);
        let shares = pair.balance_of(alice());
        let ts = pair.total_supply();

        let (a0, a1) = pair.burn(alice(), shares, None).unwrap();
        assert_eq!(a0, shares * e18(10) / ts);
        assert_eq!(a1, shares * e18(40) / ts);
        assert_eq!(pair.total_supply(), minimum_liquidity());
        assert_eq!(pair.balance_of(alice()), U256::ZERO);
    }

    #[test]
    fn test_burn_more_than_balance() {
        let mut pair = funded_pair(e18(10), e18(40), None);
        let shares = pair.balance_of(alice());
        let reserves = pair.get_reserves();

        assert_eq!(
            pair.burn(alice(), shares + U256::from(1), None),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(pair.get_reserves(), reserves);
    }

    #[test]
    fn test_locked_liquidity_cannot_be_burned() {
        let mut pair = funded_pair(e18(10), e18(40), None);
        assert_eq!(
            pair.burn(BURN_ADDRESS, U256::from(1), None),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_swap_regression_vector() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(20), e18(40), None);

        let out = pair.swap(e18(12), token_a(), &config).unwrap();
        let expected = e18(12) * U256::from(997) * e18(40)
            / (e18(20) * U256::from(1000) + e18(12) * U256::from(997));
        assert_eq!(out, expected);
        assert_eq!(pair.get_reserves(), (e18(32), e18(40) - out));
    }

    #[test]
    fn test_swap_keeps_k() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(20), e18(40), None);
        let (r0, r1) = pair.get_reserves();

        pair.swap(e18(3), token_b(), &config).unwrap();
        let (n0, n1) = pair.get_reserves();
        assert!(n0 * n1 >= r0 * r1);
    }

    #[test]
    fn test_swap_exact_rejects_greedy_output() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(20), e18(40), None);
        let fair = pair.quote_out(e18(1), token_a(), &config).unwrap();
        let reserves = pair.get_reserves();

        assert_eq!(
            pair.swap_exact(e18(1), fair + U256::from(1), token_a(), &config),
            Err(AmmError::InvariantViolation)
        );
        assert_eq!(pair.get_reserves(), reserves);

        pair.swap_exact(e18(1), fair, token_a(), &config).unwrap();
    }

    #[test]
    fn test_swap_unknown_token() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(20), e18(40), None);
        assert_eq!(
            pair.swap(e18(1), Address::repeat_byte(0x09), &config),
            Err(AmmError::InvalidPath)
        );
    }

    #[test]
    fn test_protocol_fee_accrues_after_swaps() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(100), e18(100), Some(fee_to()));
        assert!(!pair.k_last().is_zero());

        for _ in 0..5 {
            pair.swap(e18(10), token_a(), &config).unwrap();
            pair.swap(e18(10), token_b(), &config).unwrap();
        }

        let shares = pair.balance_of(alice());
        pair.burn(alice(), shares, Some(fee_to())).unwrap();
        assert!(pair.balance_of(fee_to()) > U256::ZERO);
        let (r0, r1) = pair.get_reserves();
        assert_eq!(pair.k_last(), r0 * r1);
    }

    #[test]
    fn test_fee_recipient_burn_keeps_fee_shares() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(100), e18(100), Some(fee_to()));
        pair.mint(e18(10), e18(10), fee_to(), Some(fee_to())).unwrap();
        let held = pair.balance_of(fee_to());

        for _ in 0..5 {
            pair.swap(e18(10), token_a(), &config).unwrap();
            pair.swap(e18(10), token_b(), &config).unwrap();
        }

        let supply_before = pair.total_supply();
        let burned = U256::from(1_000_000u64);
        pair.burn(fee_to(), burned, Some(fee_to())).unwrap();

        let fee_shares = pair.total_supply() + burned - supply_before;
        assert!(fee_shares > U256::ZERO);
        assert_eq!(pair.balance_of(fee_to()), held + fee_shares - burned);
        assert_eq!(
            pair.balance_of(alice()) + pair.balance_of(fee_to()) + pair.balance_of(BURN_ADDRESS),
            pair.total_supply()
        );
    }

    #[test]
    fn test_protocol_fee_formula() {
        let config = AmmConfig::default();
        let mut pair = funded_pair(e18(100), e18(100), Some(fee_to()));
        pair.swap(e18(50), token_a(), &config).unwrap();

        let (r0, r1) = pair.get_reserves();
        let root_k = math::sqrt(r0 * r1);
        let root_k_last = math::sqrt(pair.k_last());
        let expected = pair.total_supply() * (root_k - root_k_last)
            / (root_k * U256::from(5) + root_k_last);

        let minted = pair.collect_protocol_fee(Some(fee_to())).unwrap();
        assert_eq!(minted, expected);
        assert!(minted > U256::ZERO);
    }

    #[test]
    fn test_fee_off_clears_k_last() {
        let mut pair = funded_pair(e18(100), e18(100), Some(fee_to()));
        assert!(!pair.k_last().is_zero());

        pair.mint(e18(1), e18(1), alice(), None).unwrap();
        assert_eq!(pair.k_last(), U256::ZERO);
        assert_eq!(pair.balance_of(fee_to()), U256::ZERO);
    }

    #[test]
    fn test_other_token() {
        let pair = Pair::new(token_a(), token_b()).unwrap();
        assert!(pair.contains(token_a()));
        assert_eq!(pair.other_token(token_a()), Some(token_b()));
        assert_eq!(pair.other_token(alice()), None);
    }
}
