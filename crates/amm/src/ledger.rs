//! Fungible-token capability consumed by the router.
//!
//! The AMM never implements a token itself. It needs balances, allowances,
//! and the ERC-20 transfer rules on top of them, which is what
//! [`TokenLedger`] describes. [`InMemoryLedger`] is the reference store and
//! [`StagedLedger`] overlays uncommitted writes on any ledger.

use crate::error::AmmError;
use crate::math::{add, sub};
use crate::types::{Address, Amount, TokenId, U256};
use std::collections::HashMap;

/// Balance and allowance storage plus ERC-20 transfer semantics.
///
/// Implementors provide the four raw accessors; `transfer`, `approve` and
/// `transfer_from` are derived from them.
pub trait TokenLedger {
    fn balance_of(&self, token: TokenId, account: Address) -> Amount;

    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> Amount;

    fn set_balance(&mut self, token: TokenId, account: Address, amount: Amount);

    fn set_allowance(&mut self, token: TokenId, owner: Address, spender: Address, amount: Amount);

    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(
        &mut self,
        token: TokenId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(AmmError::InsufficientBalance { token, account: from });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = add(self.balance_of(token, to), amount)?;
        self.set_balance(token, from, from_balance - amount);
        self.set_balance(token, to, to_balance);
        Ok(())
    }

    fn approve(&mut self, token: TokenId, owner: Address, spender: Address, amount: Amount) {
        self.set_allowance(token, owner, spender, amount);
    }

    /// Move `amount` of `from`'s tokens on behalf of `spender`, consuming allowance.
    /// An allowance of `U256::MAX` is treated as unlimited.
    fn transfer_from(
        &mut self,
        token: TokenId,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AmmError> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(AmmError::InsufficientAllowance {
                token,
                owner: from,
                spender,
            });
        }
        self.transfer(token, from, to, amount)?;
        if allowed != U256::MAX {
            self.set_allowance(token, from, spender, sub(allowed, amount)?);
        }
        Ok(())
    }
}

/// Hash-map backed token ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(TokenId, Address), Amount>,
    allowances: HashMap<(TokenId, Address, Address), Amount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit newly issued tokens to `account`.
    pub fn mint(&mut self, token: TokenId, account: Address, amount: Amount) -> Result<(), AmmError> {
        let balance = add(self.balance_of(token, account), amount)?;
        self.set_balance(token, account, balance);
        Ok(())
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: TokenId, account: Address) -> Amount {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn set_balance(&mut self, token: TokenId, account: Address, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(&(token, account));
        } else {
            self.balances.insert((token, account), amount);
        }
    }

    fn set_allowance(&mut self, token: TokenId, owner: Address, spender: Address, amount: Amount) {
        if amount.is_zero() {
            self.allowances.remove(&(token, owner, spender));
        } else {
            self.allowances.insert((token, owner, spender), amount);
        }
    }
}

/// Uncommitted writes layered over a base ledger.
///
/// Reads fall through to the base until a key is written. The base is only
/// touched by [`LedgerChanges::apply`].
#[derive(Debug)]
pub struct StagedLedger<'a, L> {
    base: &'a L,
    changes: LedgerChanges,
}

/// Balance and allowance writes collected by a [`StagedLedger`].
#[derive(Debug, Clone, Default)]
pub struct LedgerChanges {
    balances: HashMap<(TokenId, Address), Amount>,
    allowances: HashMap<(TokenId, Address, Address), Amount>,
}

impl LedgerChanges {
    /// Write every staged value into `ledger`.
    pub fn apply<L: TokenLedger>(self, ledger: &mut L) {
        for ((token, account), amount) in self.balances {
            ledger.set_balance(token, account, amount);
        }
        for ((token, owner, spender), amount) in self.allowances {
            ledger.set_allowance(token, owner, spender, amount);
        }
    }
}

impl<'a, L: TokenLedger> StagedLedger<'a, L> {
    pub fn new(base: &'a L) -> Self {
        Self {
            base,
            changes: LedgerChanges::default(),
        }
    }

    pub fn into_changes(self) -> LedgerChanges {
        self.changes
    }
}

impl<L: TokenLedger> TokenLedger for StagedLedger<'_, L> {
    fn balance_of(&self, token: TokenId, account: Address) -> Amount {
        match self.changes.balances.get(&(token, account)) {
            Some(amount) => *amount,
            None => self.base.balance_of(token, account),
        }
    }

    fn allowance(&self, token: TokenId, owner: Address, spender: Address) -> Amount {
        match self.changes.allowances.get(&(token, owner, spender)) {
            Some(amount) => *amount,
            None => self.base.allowance(token, owner, spender),
        }
    }

    fn set_balance(&mut self, token: TokenId, account: Address, amount: Amount) {
        self.changes.balances.insert((token, account), amount);
    }

    fn set_allowance(&mut self, token: TokenId, owner: Address, spender: Address, amount: Amount) {
        self.changes
            .allowances
            .insert((token, owner, spender), amount);
    }
}
