//! Pair registry and protocol-fee governance.

use crate::error::AmmError;
use crate::pair::{Pair, PairId};
use crate::types::{Address, TokenId};
use std::collections::HashMap;
use tracing::{info, warn};

/// Read access to pairs by unordered token key.
pub trait PairLookup {
    fn lookup(&self, token_a: TokenId, token_b: TokenId) -> Option<&Pair>;
}

/// Index of a pair in the factory's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairHandle(pub usize);

/// Canonical registry of pairs.
///
/// Pairs live in an arena in creation order and are looked up by their
/// unordered token key or by address. Nothing holds a reference back into the
/// factory; callers resolve handles per call.
#[derive(Debug, Clone)]
pub struct Factory {
    /// All pairs in creation order.
    pairs: Vec<Pair>,
    /// Unordered token key to pair.
    index: HashMap<PairId, PairHandle>,
    /// Pair address to pair.
    by_address: HashMap<Address, PairHandle>,
    /// Recipient of the protocol fee. Zero disables collection.
    fee_to: Address,
    /// Sole account allowed to change `fee_to` and itself.
    fee_to_setter: Address,
}

impl Factory {
    /// Create an empty registry governed by `fee_to_setter`.
    pub fn new(fee_to_setter: Address) -> Result<Self, AmmError> {
        if fee_to_setter.is_zero() {
            return Err(AmmError::InvalidAddress);
        }
        Ok(Self {
            pairs: Vec::new(),
            index: HashMap::new(),
            by_address: HashMap::new(),
            fee_to: Address::ZERO,
            fee_to_setter,
        })
    }

    /// Validate a new pair for `(token_a, token_b)` without registering it.
    pub fn prepare_pair(&self, token_a: TokenId, token_b: TokenId) -> Result<Pair, AmmError> {
        let pair = Pair::new(token_a, token_b)?;
        if self.index.contains_key(&pair.id()) {
            return Err(AmmError::PairAlreadyExists {
                token0: pair.token0(),
                token1: pair.token1(),
            });
        }
        Ok(pair)
    }

    /// Register a pair produced by [`Factory::prepare_pair`].
    pub(crate) fn insert_pair(&mut self, pair: Pair) -> PairHandle {
        let handle = PairHandle(self.pairs.len());
        self.index.insert(pair.id(), handle);
        self.by_address.insert(pair.address(), handle);
        info!(
            token0 = %pair.token0(),
            token1 = %pair.token1(),
            pair = %pair.address(),
            "pair created"
        );
        self.pairs.push(pair);
        handle
    }

    /// Create a new pair. Returns its address.
    pub fn create_pair(&mut self, token_a: TokenId, token_b: TokenId) -> Result<Address, AmmError> {
        let pair = self.prepare_pair(token_a, token_b)?;
        let address = pair.address();
        self.insert_pair(pair);
        Ok(address)
    }

    /// Address of the pair for the two tokens, in either order.
    pub fn get_pair(&self, token_a: TokenId, token_b: TokenId) -> Option<Address> {
        self.pair_by_tokens(token_a, token_b).map(Pair::address)
    }

    pub fn handle(&self, token_a: TokenId, token_b: TokenId) -> Option<PairHandle> {
        self.index.get(&PairId::from_tokens(token_a, token_b)).copied()
    }

    pub fn handle_by_address(&self, pair: Address) -> Option<PairHandle> {
        self.by_address.get(&pair).copied()
    }

    pub fn pair(&self, handle: PairHandle) -> Option<&Pair> {
        self.pairs.get(handle.0)
    }

    pub fn pair_by_tokens(&self, token_a: TokenId, token_b: TokenId) -> Option<&Pair> {
        self.handle(token_a, token_b).and_then(|h| self.pair(h))
    }

    pub fn pair_by_address(&self, pair: Address) -> Option<&Pair> {
        self.handle_by_address(pair).and_then(|h| self.pair(h))
    }

    /// Overwrite a pair with its committed state.
    pub(crate) fn replace(&mut self, handle: PairHandle, pair: Pair) {
        if let Some(slot) = self.pairs.get_mut(handle.0) {
            *slot = pair;
        }
    }

    /// Address of the `index`-th pair ever created.
    pub fn all_pairs(&self, index: usize) -> Option<Address> {
        self.pairs.get(index).map(Pair::address)
    }

    pub fn all_pairs_length(&self) -> usize {
        self.pairs.len()
    }

    /// Protocol fee recipient, `None` while collection is disabled.
    pub fn fee_to(&self) -> Option<Address> {
        (!self.fee_to.is_zero()).then_some(self.fee_to)
    }

    pub fn fee_to_setter(&self) -> Address {
        self.fee_to_setter
    }

    /// Point protocol fees at `recipient`. Zero turns collection off.
    pub fn set_fee_to(&mut self, caller: Address, recipient: Address) -> Result<(), AmmError> {
        if caller != self.fee_to_setter {
            warn!(%caller, "rejected set_fee_to from non-setter");
            return Err(AmmError::Unauthorized(caller));
        }
        self.fee_to = recipient;
        info!(fee_to = %recipient, "protocol fee recipient updated");
        Ok(())
    }

    /// Hand governance to `new_setter`, which must be non-zero.
    pub fn set_fee_to_setter(&mut self, caller: Address, new_setter: Address) -> Result<(), AmmError> {
        if caller != self.fee_to_setter {
            warn!(%caller, "rejected set_fee_to_setter from non-setter");
            return Err(AmmError::Unauthorized(caller));
        }
        if new_setter.is_zero() {
            return Err(AmmError::InvalidAddress);
        }
        self.fee_to_setter = new_setter;
        info!(fee_to_setter = %new_setter, "fee setter updated");
        Ok(())
    }
}

impl PairLookup for Factory {
    fn lookup(&self, token_a: TokenId, token_b: TokenId) -> Option<&Pair> {
        self.pair_by_tokens(token_a, token_b)
    }
}
