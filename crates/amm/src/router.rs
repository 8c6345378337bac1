//! User-facing entry points: liquidity provision and multi-hop swaps.
//!
//! Every state-changing call runs against a [`Transaction`] and is committed
//! only once the whole call has succeeded, so a failing hop, slippage check or
//! transfer leaves the factory and the token ledger exactly as they were.

use crate::aggregator::RouterAggregator;
use crate::config::AmmConfig;
use crate::error::AmmError;
use crate::factory::{Factory, PairHandle, PairLookup};
use crate::ledger::{InMemoryLedger, TokenLedger};
use crate::math;
use crate::pair;
use crate::path_finder::{BridgeTokens, PathFinder};
use crate::transaction::{Changeset, Transaction};
use crate::types::{Address, Amount, TokenId, BURN_ADDRESS};
use tracing::{debug, info};

/// Outcome of a successful [`Router::add_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityAdded {
    /// Address of the pair that received the deposit.
    pub pair: Address,
    pub amount_a: Amount,
    pub amount_b: Amount,
    /// LP shares minted to the recipient.
    pub liquidity: Amount,
}

/// Router over a pair registry and a token ledger.
///
/// The router owns all mutable AMM state. The block timestamp is injected by
/// the host through [`Router::set_timestamp`] and deadlines are checked
/// against it before anything is staged.
#[derive(Debug, Clone)]
pub struct Router<L = InMemoryLedger> {
    config: AmmConfig,
    factory: Factory,
    ledger: L,
    timestamp: u64,
}

impl<L: TokenLedger> Router<L> {
    /// Create a router with the default configuration.
    pub fn new(fee_to_setter: Address, ledger: L) -> Result<Self, AmmError> {
        Self::with_config(AmmConfig::default(), fee_to_setter, ledger)
    }

    /// Create a router with custom configuration.
    pub fn with_config(
        config: AmmConfig,
        fee_to_setter: Address,
        ledger: L,
    ) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self {
            config,
            factory: Factory::new(fee_to_setter)?,
            ledger,
            timestamp: 0,
        })
    }

    pub fn config(&self) -> &AmmConfig {
        &self.config
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for the host (seeding balances, approvals).
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Spender identity users approve so the router can pull their tokens.
    pub fn address(&self) -> Address {
        self.config.router_address
    }

    /// Single-hop quoting view.
    pub fn aggregator(&self) -> RouterAggregator<'_> {
        RouterAggregator::new(&self.factory, &self.config)
    }

    /// Bridge-route search over the current pairs.
    pub fn path_finder(&self, bridges: BridgeTokens) -> PathFinder<'_> {
        PathFinder::new(self.aggregator(), bridges)
    }

    fn ensure(&self, deadline: u64) -> Result<(), AmmError> {
        if deadline <= self.timestamp {
            return Err(AmmError::Expired {
                deadline,
                now: self.timestamp,
            });
        }
        Ok(())
    }

    fn begin(&self) -> Transaction<'_, L> {
        Transaction::new(&self.factory, &self.ledger, &self.config)
    }

    fn commit(&mut self, changes: Changeset) {
        changes.apply(&mut self.factory, &mut self.ledger);
    }

    /// Deposit both tokens of a pair, creating the pair if needed.
    ///
    /// Against an existing price the desired amounts are clamped to the
    /// reserve ratio, keeping whichever side binds. Tokens are pulled from
    /// `caller` with `transfer_from`, so the router address must hold an
    /// allowance for both. `to` may not be the zero or burn address.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        amount_a_desired: Amount,
        amount_b_desired: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
        to: Address,
        deadline: u64,
    ) -> Result<LiquidityAdded, AmmError> {
        self.ensure(deadline)?;
        // Shares held by the burn address can never be redeemed.
        if to.is_zero() || to == BURN_ADDRESS {
            return Err(AmmError::InvalidAddress);
        }
        let spender = self.address();

        let mut tx = self.begin();
        let handle = match tx.handle(token_a, token_b) {
            Some(handle) => handle,
            None => tx.create_pair(token_a, token_b)?,
        };
        let pair = staged(&tx, handle, token_a, token_b)?;
        let pair_address = pair.address();
        let token0 = pair.token0();
        let (reserve_a, reserve_b) = pair.reserves_for(token_a)?;

        let (amount_a, amount_b) = optimal_amounts(
            (amount_a_desired, amount_b_desired),
            (amount_a_min, amount_b_min),
            (reserve_a, reserve_b),
        )?;

        tx.ledger()
            .transfer_from(token_a, spender, caller, pair_address, amount_a)?;
        tx.ledger()
            .transfer_from(token_b, spender, caller, pair_address, amount_b)?;

        let (amount0, amount1) = if token_a == token0 {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let fee_to = tx.fee_to();
        let liquidity = staged_mut(&mut tx, handle, token_a, token_b)?
            .mint(amount0, amount1, to, fee_to)?;

        let changes = tx.into_changeset();
        self.commit(changes);

        info!(
            pair = %pair_address,
            %amount_a,
            %amount_b,
            %liquidity,
            %to,
            "liquidity added"
        );
        Ok(LiquidityAdded {
            pair: pair_address,
            amount_a,
            amount_b,
            liquidity,
        })
    }

    /// Redeem `liquidity` LP shares held by `caller` and pay both tokens to `to`.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        liquidity: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
        to: Address,
        deadline: u64,
    ) -> Result<(Amount, Amount), AmmError> {
        self.ensure(deadline)?;

        let mut tx = self.begin();
        let handle = tx.resolve(token_a, token_b)?;
        let fee_to = tx.fee_to();
        let pair = staged_mut(&mut tx, handle, token_a, token_b)?;
        let pair_address = pair.address();
        let token0 = pair.token0();
        let (amount0, amount1) = pair.burn(caller, liquidity, fee_to)?;

        let (amount_a, amount_b) = if token_a == token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min {
            return Err(AmmError::SlippageExceeded {
                actual: amount_a,
                minimum: amount_a_min,
            });
        }
        if amount_b < amount_b_min {
            return Err(AmmError::SlippageExceeded {
                actual: amount_b,
                minimum: amount_b_min,
            });
        }

        tx.ledger().transfer(token_a, pair_address, to, amount_a)?;
        tx.ledger().transfer(token_b, pair_address, to, amount_b)?;

        let changes = tx.into_changeset();
        self.commit(changes);

        info!(
            pair = %pair_address,
            %liquidity,
            %amount_a,
            %amount_b,
            %to,
            "liquidity removed"
        );
        Ok((amount_a, amount_b))
    }

    /// Sell exactly `amount_in` of `path[0]` along `path`.
    ///
    /// Each hop spends the previous hop's output. Only the final output is
    /// checked against `amount_out_min`. Returns the amount entering every
    /// hop followed by the final output.
    pub fn swap_exact_tokens_for_tokens(
        &mut self,
        caller: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[TokenId],
        to: Address,
        deadline: u64,
    ) -> Result<Vec<Amount>, AmmError> {
        self.ensure(deadline)?;
        let spender = self.address();

        let mut tx = self.begin();
        let handles = resolve_path(&tx, path)?;
        let config = tx.config();

        let first = pair_address(&tx, handles[0], path)?;
        tx.ledger()
            .transfer_from(path[0], spender, caller, first, amount_in)?;

        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        let mut amount = amount_in;
        for (hop, handle) in handles.iter().enumerate() {
            let (token_in, token_out) = (path[hop], path[hop + 1]);
            let pair = staged_mut(&mut tx, *handle, token_in, token_out)?;
            let from = pair.address();
            amount = pair.swap(amount, token_in, config)?;
            let recipient = next_recipient(&tx, &handles, hop, path, to)?;
            tx.ledger().transfer(token_out, from, recipient, amount)?;
            debug!(hop, %token_in, %token_out, amount_out = %amount, "hop executed");
            amounts.push(amount);
        }

        if amount < amount_out_min {
            return Err(AmmError::SlippageExceeded {
                actual: amount,
                minimum: amount_out_min,
            });
        }

        let changes = tx.into_changeset();
        self.commit(changes);

        info!(hops = handles.len(), %amount_in, amount_out = %amount, %to, "swap exact in");
        Ok(amounts)
    }

    /// Buy exactly `amount_out` of the last token in `path`.
    ///
    /// Required inputs are computed backwards from the output. A path that
    /// crosses the same pair twice is rejected, since its backward quote
    /// would not match the state the second crossing sees.
    pub fn swap_tokens_for_exact_tokens(
        &mut self,
        caller: Address,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[TokenId],
        to: Address,
        deadline: u64,
    ) -> Result<Vec<Amount>, AmmError> {
        self.ensure(deadline)?;
        let spender = self.address();

        let mut tx = self.begin();
        let handles = resolve_path(&tx, path)?;
        let mut seen = handles.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != handles.len() {
            return Err(AmmError::InvalidPath);
        }

        let config = tx.config();
        let amounts = get_amounts_in(&tx, config, amount_out, path)?;
        if amounts[0] > amount_in_max {
            return Err(AmmError::ExcessiveInputAmount {
                required: amounts[0],
                maximum: amount_in_max,
            });
        }

        let first = pair_address(&tx, handles[0], path)?;
        tx.ledger()
            .transfer_from(path[0], spender, caller, first, amounts[0])?;

        for (hop, handle) in handles.iter().enumerate() {
            let (token_in, token_out) = (path[hop], path[hop + 1]);
            let pair = staged_mut(&mut tx, *handle, token_in, token_out)?;
            let from = pair.address();
            pair.swap_exact(amounts[hop], amounts[hop + 1], token_in, config)?;
            let recipient = next_recipient(&tx, &handles, hop, path, to)?;
            tx.ledger()
                .transfer(token_out, from, recipient, amounts[hop + 1])?;
            debug!(hop, %token_in, %token_out, amount_out = %amounts[hop + 1], "hop executed");
        }

        let changes = tx.into_changeset();
        self.commit(changes);

        info!(hops = handles.len(), amount_in = %amounts[0], %amount_out, %to, "swap exact out");
        Ok(amounts)
    }

    /// Create an empty pair. Returns its address.
    pub fn create_pair(&mut self, token_a: TokenId, token_b: TokenId) -> Result<Address, AmmError> {
        self.factory.create_pair(token_a, token_b)
    }

    pub fn get_pair(&self, token_a: TokenId, token_b: TokenId) -> Option<Address> {
        self.factory.get_pair(token_a, token_b)
    }

    pub fn set_fee_to(&mut self, caller: Address, recipient: Address) -> Result<(), AmmError> {
        self.factory.set_fee_to(caller, recipient)
    }

    pub fn set_fee_to_setter(&mut self, caller: Address, new_setter: Address) -> Result<(), AmmError> {
        self.factory.set_fee_to_setter(caller, new_setter)
    }

    /// Reserves of the pair at `pair`, in `(token0, token1)` order.
    pub fn get_reserves(&self, pair: Address) -> Option<(Amount, Amount)> {
        self.factory.pair_by_address(pair).map(|p| p.get_reserves())
    }

    /// LP share balance of `holder` in the `(token_a, token_b)` pair.
    pub fn liquidity_of(&self, token_a: TokenId, token_b: TokenId, holder: Address) -> Amount {
        self.factory
            .pair_by_tokens(token_a, token_b)
            .map(|p| p.balance_of(holder))
            .unwrap_or_default()
    }

    pub fn sort_tokens(&self, token_a: TokenId, token_b: TokenId) -> Result<(TokenId, TokenId), AmmError> {
        pair::sort_tokens(token_a, token_b)
    }

    pub fn quote(&self, amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, AmmError> {
        math::quote(amount_a, reserve_a, reserve_b)
    }

    pub fn get_amount_out(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, AmmError> {
        math::get_amount_out(amount_in, reserve_in, reserve_out, &self.config)
    }

    pub fn get_amount_in(
        &self,
        amount_out: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Amount, AmmError> {
        math::get_amount_in(amount_out, reserve_in, reserve_out, &self.config)
    }

    pub fn get_amounts_out(&self, amount_in: Amount, path: &[TokenId]) -> Result<Vec<Amount>, AmmError> {
        get_amounts_out(&self.factory, &self.config, amount_in, path)
    }

    pub fn get_amounts_in(&self, amount_out: Amount, path: &[TokenId]) -> Result<Vec<Amount>, AmmError> {
        get_amounts_in(&self.factory, &self.config, amount_out, path)
    }
}

/// Chained exact-input quotes along `path` against `pairs`.
pub fn get_amounts_out<P: PairLookup>(
    pairs: &P,
    config: &AmmConfig,
    amount_in: Amount,
    path: &[TokenId],
) -> Result<Vec<Amount>, AmmError> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);
    let mut amount = amount_in;
    for hop in path.windows(2) {
        let (reserve_in, reserve_out) = lookup(pairs, hop[0], hop[1])?.reserves_for(hop[0])?;
        amount = math::get_amount_out(amount, reserve_in, reserve_out, config)?;
        amounts.push(amount);
    }
    Ok(amounts)
}

/// Chained exact-output quotes along `path`, computed from the last hop back.
pub fn get_amounts_in<P: PairLookup>(
    pairs: &P,
    config: &AmmConfig,
    amount_out: Amount,
    path: &[TokenId],
) -> Result<Vec<Amount>, AmmError> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    let mut amounts = vec![Amount::ZERO; path.len()];
    amounts[path.len() - 1] = amount_out;
    for i in (1..path.len()).rev() {
        let (reserve_in, reserve_out) = lookup(pairs, path[i - 1], path[i])?.reserves_for(path[i - 1])?;
        amounts[i - 1] = math::get_amount_in(amounts[i], reserve_in, reserve_out, config)?;
    }
    Ok(amounts)
}

fn lookup<P: PairLookup>(pairs: &P, token_a: TokenId, token_b: TokenId) -> Result<&pair::Pair, AmmError> {
    pairs
        .lookup(token_a, token_b)
        .ok_or(AmmError::PairNotFound { token_a, token_b })
}

/// Amounts to deposit given the caller's bounds and the current reserves.
fn optimal_amounts(
    (amount_a_desired, amount_b_desired): (Amount, Amount),
    (amount_a_min, amount_b_min): (Amount, Amount),
    (reserve_a, reserve_b): (Amount, Amount),
) -> Result<(Amount, Amount), AmmError> {
    if reserve_a.is_zero() && reserve_b.is_zero() {
        return Ok((amount_a_desired, amount_b_desired));
    }
    let amount_b_optimal = math::quote(amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= amount_b_desired {
        if amount_b_optimal < amount_b_min {
            return Err(AmmError::SlippageExceeded {
                actual: amount_b_optimal,
                minimum: amount_b_min,
            });
        }
        return Ok((amount_a_desired, amount_b_optimal));
    }
    let amount_a_optimal = math::quote(amount_b_desired, reserve_b, reserve_a)?;
    if amount_a_optimal < amount_a_min {
        return Err(AmmError::SlippageExceeded {
            actual: amount_a_optimal,
            minimum: amount_a_min,
        });
    }
    Ok((amount_a_optimal.min(amount_a_desired), amount_b_desired))
}

fn resolve_path<L: TokenLedger>(tx: &Transaction<'_, L>, path: &[TokenId]) -> Result<Vec<PairHandle>, AmmError> {
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    path.windows(2)
        .map(|hop| tx.resolve(hop[0], hop[1]))
        .collect()
}

fn staged<'t, L: TokenLedger>(
    tx: &'t Transaction<'_, L>,
    handle: PairHandle,
    token_a: TokenId,
    token_b: TokenId,
) -> Result<&'t pair::Pair, AmmError> {
    tx.pair(handle)
        .ok_or(AmmError::PairNotFound { token_a, token_b })
}

fn staged_mut<'t, L: TokenLedger>(
    tx: &'t mut Transaction<'_, L>,
    handle: PairHandle,
    token_a: TokenId,
    token_b: TokenId,
) -> Result<&'t mut pair::Pair, AmmError> {
    tx.pair_mut(handle)
        .ok_or(AmmError::PairNotFound { token_a, token_b })
}

fn pair_address<L: TokenLedger>(
    tx: &Transaction<'_, L>,
    handle: PairHandle,
    path: &[TokenId],
) -> Result<Address, AmmError> {
    staged(tx, handle, path[0], path[1]).map(pair::Pair::address)
}

/// Where hop `hop` sends its output: the next pair, or `to` after the last hop.
fn next_recipient<L: TokenLedger>(
    tx: &Transaction<'_, L>,
    handles: &[PairHandle],
    hop: usize,
    path: &[TokenId],
    to: Address,
) -> Result<Address, AmmError> {
    match handles.get(hop + 1) {
        Some(next) => staged(tx, *next, path[hop + 1], path[hop + 2]).map(pair::Pair::address),
        None => Ok(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{minimum_liquidity, U256};

    const NOW: u64 = 1_000;
    const DEADLINE: u64 = NOW + 60;

    fn setter() -> Address {
        Address::repeat_byte(0x5E)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xAA)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xBB)
    }

    fn token(n: u8) -> TokenId {
        Address::repeat_byte(n)
    }

    fn e18(v: u64) -> U256 {
        U256::from(v) * U256::from(10u64.pow(18))
    }

    fn setup_router() -> Router {
        let mut router = Router::new(setter(), InMemoryLedger::new()).unwrap();
        router.set_timestamp(NOW);
        let spender = router.address();
        for n in 1..=3 {
            router
                .ledger_mut()
                .mint(token(n), alice(), e18(1_000))
                .unwrap();
            router
                .ledger_mut()
                .approve(token(n), alice(), spender, U256::MAX);
        }
        router
    }

    fn provide(router: &mut Router, a: TokenId, b: TokenId, amount_a: U256, amount_b: U256) -> LiquidityAdded {
        router
            .add_liquidity(alice(), a, b, amount_a, amount_b, U256::ZERO, U256::ZERO, alice(), DEADLINE)
            .unwrap()
    }

    fn assert_balances_match_reserves(router: &Router, a: TokenId, b: TokenId) {
        let pair = router.factory().pair_by_tokens(a, b).unwrap();
        let (r0, r1) = pair.get_reserves();
        assert_eq!(router.ledger().balance_of(pair.token0(), pair.address()), r0);
        assert_eq!(router.ledger().balance_of(pair.token1(), pair.address()), r1);
    }

    #[test]
    fn test_add_liquidity_creates_pair() {
        let mut router = setup_router();
        let added = provide(&mut router, token(2), token(1), e18(40), e18(20));

        assert_eq!(router.get_pair(token(1), token(2)), Some(added.pair));
        assert_eq!(added.amount_a, e18(40));
        assert_eq!(added.amount_b, e18(20));
        assert_eq!(router.get_reserves(added.pair), Some((e18(20), e18(40))));
        assert_eq!(router.liquidity_of(token(1), token(2), alice()), added.liquidity);
        assert_eq!(router.ledger().balance_of(token(1), alice()), e18(980));
        assert_balances_match_reserves(&router, token(1), token(2));
    }

    #[test]
    fn test_add_liquidity_clamps_to_price() {
        let mut router = setup_router();
        provide(&mut router, token(1), token(2), e18(10), e18(40));

        // B binds: 10 A only needs 40 B, 20 B only needs 5 A
        let added = provide(&mut router, token(1), token(2), e18(10), e18(20));
        assert_eq!(added.amount_a, e18(5));
        assert_eq!(added.amount_b, e18(20));

        let err = router
            .add_liquidity(alice(), token(1), token(2), e18(10), e18(20), e18(6), U256::ZERO, alice(), DEADLINE)
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::SlippageExceeded {
                actual: e18(5),
                minimum: e18(6)
            }
        );
    }

    #[test]
    fn test_expired_deadline() {
        let mut router = setup_router();
        let err = router
            .add_liquidity(alice(), token(1), token(2), e18(1), e18(1), U256::ZERO, U256::ZERO, alice(), NOW)
            .unwrap_err();
        assert_eq!(err, AmmError::Expired { deadline: NOW, now: NOW });
        assert_eq!(router.factory().all_pairs_length(), 0);
    }

    #[test]
    fn test_add_liquidity_rejects_burn_recipient() {
        let mut router = setup_router();
        for to in [BURN_ADDRESS, Address::ZERO] {
            let err = router
                .add_liquidity(alice(), token(1), token(2), e18(1), e18(1), U256::ZERO, U256::ZERO, to, DEADLINE)
                .unwrap_err();
            assert_eq!(err, AmmError::InvalidAddress);
        }
        assert_eq!(router.get_pair(token(1), token(2)), None);
        assert_eq!(router.ledger().balance_of(token(1), alice()), e18(1_000));
    }

    #[test]
    fn test_failed_add_does_not_create_pair() {
        let mut router = setup_router();
        // bob has no tokens, the pull fails after the pair was staged
        let err = router
            .add_liquidity(bob(), token(1), token(2), e18(1), e18(1), U256::ZERO, U256::ZERO, bob(), DEADLINE)
            .unwrap_err();
        assert!(matches!(err, AmmError::InsufficientAllowance { .. }));
        assert_eq!(router.get_pair(token(1), token(2)), None);
    }

    #[test]
    fn test_remove_all_liquidity() {
        let mut router = setup_router();
        let added = provide(&mut router, token(1), token(2), e18(10), e18(40));

        let (a, b) = router
            .remove_liquidity(alice(), token(1), token(2), added.liquidity, U256::ZERO, U256::ZERO, bob(), DEADLINE)
            .unwrap();
        assert_eq!(router.ledger().balance_of(token(1), bob()), a);
        assert_eq!(router.ledger().balance_of(token(2), bob()), b);

        let pair = router.factory().pair_by_tokens(token(1), token(2)).unwrap();
        assert_eq!(pair.total_supply(), minimum_liquidity());
        assert_eq!(pair.balance_of(BURN_ADDRESS), minimum_liquidity());
        assert_balances_match_reserves(&router, token(1), token(2));
    }

    #[test]
    fn test_remove_liquidity_slippage_rolls_back() {
        let mut router = setup_router();
        let added = provide(&mut router, token(1), token(2), e18(10), e18(40));

        let err = router
            .remove_liquidity(alice(), token(1), token(2), added.liquidity, e18(10), U256::ZERO, alice(), DEADLINE)
            .unwrap_err();
        assert!(matches!(err, AmmError::SlippageExceeded { .. }));
        assert_eq!(router.liquidity_of(token(1), token(2), alice()), added.liquidity);
        assert_balances_match_reserves(&router, token(1), token(2));
    }

    #[test]
    fn test_remove_missing_pair() {
        let mut router = setup_router();
        assert_eq!(
            router.remove_liquidity(alice(), token(1), token(2), e18(1), U256::ZERO, U256::ZERO, alice(), DEADLINE),
            Err(AmmError::PairNotFound {
                token_a: token(1),
                token_b: token(2)
            })
        );
    }

    #[test]
    fn test_swap_exact_in_single_hop() {
        let mut router = setup_router();
        provide(&mut router, token(1), token(2), e18(20), e18(40));
        let expected = router.get_amount_out(e18(12), e18(20), e18(40)).unwrap();

        let amounts = router
            .swap_exact_tokens_for_tokens(alice(), e18(12), U256::ZERO, &[token(1), token(2)], bob(), DEADLINE)
            .unwrap();
        assert_eq!(amounts, vec![e18(12), expected]);
        assert_eq!(router.ledger().balance_of(token(2), bob()), expected);
        assert_balances_match_reserves(&router, token(1), token(2));
    }

    #[test]
    fn test_swap_bad_paths() {
        let mut router = setup_router();
        provide(&mut router, token(1), token(2), e18(20), e18(40));

        assert_eq!(
            router.swap_exact_tokens_for_tokens(alice(), e18(1), U256::ZERO, &[token(1)], bob(), DEADLINE),
            Err(AmmError::InvalidPath)
        );
        assert!(matches!(
            router.swap_exact_tokens_for_tokens(alice(), e18(1), U256::ZERO, &[token(1), token(3)], bob(), DEADLINE),
            Err(AmmError::PairNotFound { .. })
        ));
        assert_eq!(
            router.swap_tokens_for_exact_tokens(
                alice(),
                e18(1),
                e18(10),
                &[token(1), token(2), token(1), token(2)],
                bob(),
                DEADLINE
            ),
            Err(AmmError::InvalidPath)
        );
    }

    #[test]
    fn test_swap_exact_out() {
        let mut router = setup_router();
        provide(&mut router, token(1), token(2), e18(20), e18(40));
        let required = router.get_amount_in(e18(5), e18(20), e18(40)).unwrap();

        let err = router
            .swap_tokens_for_exact_tokens(alice(), e18(5), required - U256::from(1), &[token(1), token(2)], bob(), DEADLINE)
            .unwrap_err();
        assert_eq!(
            err,
            AmmError::ExcessiveInputAmount {
                required,
                maximum: required - U256::from(1)
            }
        );

        let amounts = router
            .swap_tokens_for_exact_tokens(alice(), e18(5), required, &[token(1), token(2)], bob(), DEADLINE)
            .unwrap();
        assert_eq!(amounts, vec![required, e18(5)]);
        assert_eq!(router.ledger().balance_of(token(2), bob()), e18(5));
        assert_balances_match_reserves(&router, token(1), token(2));
    }

    #[test]
    fn test_governance_pass_through() {
        let mut router = setup_router();
        assert_eq!(
            router.set_fee_to(alice(), alice()),
            Err(AmmError::Unauthorized(alice()))
        );
        assert_eq!(router.factory().fee_to(), None);
        router.set_fee_to(setter(), bob()).unwrap();
        assert_eq!(router.factory().fee_to(), Some(bob()));
        router.set_fee_to_setter(setter(), alice()).unwrap();
        assert_eq!(router.factory().fee_to_setter(), alice());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AmmConfig::default().with_fee_bps(10_000);
        assert!(matches!(
            Router::with_config(config, setter(), InMemoryLedger::new()),
            Err(AmmError::InvalidConfig(_))
        ));
    }
}
