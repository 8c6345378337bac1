//! Staged execution of one router call.
//!
//! A [`Transaction`] reads committed state through shared borrows and keeps
//! every write in scratch space: copy-on-write pairs, pairs created during
//! the call, and a [`StagedLedger`]. Only a call that returns `Ok` turns its
//! scratch into a [`Changeset`]; an error simply drops it.

use crate::config::AmmConfig;
use crate::error::AmmError;
use crate::factory::{Factory, PairHandle, PairLookup};
use crate::ledger::{LedgerChanges, StagedLedger, TokenLedger};
use crate::pair::{Pair, PairId};
use crate::types::{Address, TokenId};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

pub struct Transaction<'a, L> {
    factory: &'a Factory,
    config: &'a AmmConfig,
    /// Pairs written by this call, keyed by handle. Handles at or past
    /// `factory.all_pairs_length()` are pairs created by this call.
    pairs: BTreeMap<PairHandle, Pair>,
    ledger: StagedLedger<'a, L>,
}

impl<'a, L: TokenLedger> Transaction<'a, L> {
    pub fn new(factory: &'a Factory, ledger: &'a L, config: &'a AmmConfig) -> Self {
        Self {
            factory,
            config,
            pairs: BTreeMap::new(),
            ledger: StagedLedger::new(ledger),
        }
    }

    pub fn config(&self) -> &'a AmmConfig {
        self.config
    }

    pub fn fee_to(&self) -> Option<Address> {
        self.factory.fee_to()
    }

    pub fn ledger(&mut self) -> &mut StagedLedger<'a, L> {
        &mut self.ledger
    }

    fn is_created(&self, handle: PairHandle) -> bool {
        handle.0 >= self.factory.all_pairs_length()
    }

    /// Handle for the unordered token pair, including pairs created in this call.
    pub fn handle(&self, token_a: TokenId, token_b: TokenId) -> Option<PairHandle> {
        if let Some(handle) = self.factory.handle(token_a, token_b) {
            return Some(handle);
        }
        let id = PairId::from_tokens(token_a, token_b);
        self.pairs
            .range(PairHandle(self.factory.all_pairs_length())..)
            .find(|(_, pair)| pair.id() == id)
            .map(|(handle, _)| *handle)
    }

    /// Like [`Transaction::handle`], failing with `PairNotFound`.
    pub fn resolve(&self, token_a: TokenId, token_b: TokenId) -> Result<PairHandle, AmmError> {
        self.handle(token_a, token_b)
            .ok_or(AmmError::PairNotFound { token_a, token_b })
    }

    /// Current view of a pair: staged if written, committed otherwise.
    pub fn pair(&self, handle: PairHandle) -> Option<&Pair> {
        self.pairs
            .get(&handle)
            .or_else(|| self.factory.pair(handle))
    }

    /// Writable copy of a pair, cloned from committed state on first use.
    pub fn pair_mut(&mut self, handle: PairHandle) -> Option<&mut Pair> {
        match self.pairs.entry(handle) {
            Entry::Occupied(entry) => Some(entry.into_mut()),
            Entry::Vacant(entry) => {
                let pair = self.factory.pair(handle)?.clone();
                Some(entry.insert(pair))
            }
        }
    }

    /// Stage a new pair. Fails like [`Factory::create_pair`].
    pub fn create_pair(&mut self, token_a: TokenId, token_b: TokenId) -> Result<PairHandle, AmmError> {
        let pair = self.factory.prepare_pair(token_a, token_b)?;
        if self.handle(token_a, token_b).is_some() {
            return Err(AmmError::PairAlreadyExists {
                token0: pair.token0(),
                token1: pair.token1(),
            });
        }
        let created = self
            .pairs
            .keys()
            .filter(|handle| self.is_created(**handle))
            .count();
        let handle = PairHandle(self.factory.all_pairs_length() + created);
        self.pairs.insert(handle, pair);
        Ok(handle)
    }

    /// Freeze the scratch state for commit.
    pub fn into_changeset(self) -> Changeset {
        let committed = self.factory.all_pairs_length();
        let mut created = Vec::new();
        let mut updated = Vec::new();
        for (handle, pair) in self.pairs {
            if handle.0 >= committed {
                created.push(pair);
            } else {
                updated.push((handle, pair));
            }
        }
        Changeset {
            created,
            updated,
            ledger: self.ledger.into_changes(),
        }
    }
}

impl<L: TokenLedger> PairLookup for Transaction<'_, L> {
    fn lookup(&self, token_a: TokenId, token_b: TokenId) -> Option<&Pair> {
        self.handle(token_a, token_b).and_then(|h| self.pair(h))
    }
}

/// Every write of a successful call, ready to be applied in one step.
#[derive(Debug)]
pub struct Changeset {
    /// New pairs in handle order.
    created: Vec<Pair>,
    updated: Vec<(PairHandle, Pair)>,
    ledger: LedgerChanges,
}

impl Changeset {
    pub fn apply<L: TokenLedger>(self, factory: &mut Factory, ledger: &mut L) {
        for (handle, pair) in self.updated {
            factory.replace(handle, pair);
        }
        for pair in self.created {
            factory.insert_pair(pair);
        }
        self.ledger.apply(ledger);
    }
}
