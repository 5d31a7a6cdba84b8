//! In-memory ledger gateway
//!
//! Reference [`LedgerGateway`] used by the replay tool and the test-suite.
//! Balances are seeded with [`InMemoryLedger::credit`]; how funds reach the
//! ledger in the first place is the wallet's business, not the arena's.

use crate::common::traits::LedgerGateway;
use crate::common::types::{Address, Amount};
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-player balance split into free and escrowed funds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub total: Amount,
    pub locked: Amount,
}

impl Account {
    pub fn free(&self) -> Amount {
        self.total - self.locked
    }
}

/// Ledger operations, used to inject failures in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    Lock,
    Unlock,
    Payout,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: BTreeMap<Address, Account>,
    fail_next: Option<LedgerOp>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from initial balances
    pub fn with_balances<I>(balances: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Address, Amount)>,
    {
        let mut ledger = Self::new();
        for (player, amount) in balances {
            ledger.credit(&player, amount)?;
        }
        Ok(ledger)
    }

    pub fn credit(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        let account = self.accounts.entry(*player).or_default();
        account.total = account
            .total
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*player))?;
        Ok(())
    }

    pub fn account(&self, player: &Address) -> Account {
        self.accounts.get(player).copied().unwrap_or_default()
    }

    pub fn locked_of(&self, player: &Address) -> Amount {
        self.account(player).locked
    }

    /// Sum of all balances; settlement moves funds but never creates them
    pub fn total_supply(&self) -> Amount {
        self.accounts.values().map(|a| a.total).sum()
    }

    /// Make the next call of `op` fail with `LedgerError::Unavailable`
    pub fn fail_next(&mut self, op: LedgerOp) {
        self.fail_next = Some(op);
    }

    fn injected_failure(&mut self, op: LedgerOp) -> Result<(), LedgerError> {
        if self.fail_next == Some(op) {
            self.fail_next = None;
            return Err(LedgerError::Unavailable(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

impl LedgerGateway for InMemoryLedger {
    fn balance_of(&self, player: &Address) -> Amount {
        self.account(player).total
    }

    fn lock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.injected_failure(LedgerOp::Lock)?;
        let account = self.account(player);
        if account.free() < amount {
            return Err(LedgerError::InsufficientBalance {
                player: *player,
                free: account.free(),
                requested: amount,
            });
        }
        self.accounts.entry(*player).or_default().locked += amount;
        Ok(())
    }

    fn unlock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.injected_failure(LedgerOp::Unlock)?;
        let account = self.account(player);
        if account.locked < amount {
            return Err(LedgerError::NotLocked {
                player: *player,
                locked: account.locked,
                requested: amount,
            });
        }
        self.accounts.entry(*player).or_default().locked -= amount;
        Ok(())
    }

    fn payout(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.injected_failure(LedgerOp::Payout)?;
        let source = self.account(from);
        if source.free() < amount {
            return Err(LedgerError::InsufficientBalance {
                player: *from,
                free: source.free(),
                requested: amount,
            });
        }
        let target = self.account(to);
        let credited = target
            .total
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        self.accounts.entry(*from).or_default().total -= amount;
        self.accounts.entry(*to).or_default().total = credited;
        Ok(())
    }
}
